//! Database Models
//!
//! Typed rows for candidate profiles, tag associations, the per-company
//! credit ledger and the append-only unlock history. Work-history style
//! data lives in proper relations, never serialized blobs, so search and
//! facet computation stay free of ad hoc JSON parsing.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{Availability, ExperienceLevel, RemotePreference, TagCategory};

/// One candidate profile row.
///
/// PII fields (`name`, `email`, `phone`, the social URLs, `image_url`) are
/// present here in full; the access-control layer decides what a given
/// viewer may see. Rows are never hard-deleted: `is_active = false` removes
/// a profile from search while keeping purchased unlocks auditable.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateProfile {
    pub id: Uuid,

    /// Owning user (profile owners always see their own data unredacted).
    pub user_id: Uuid,

    // ---- PII, withheld when anonymized and not unlocked ----
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub image_url: Option<String>,

    // ---- Searchable attributes ----
    pub title: String,

    /// Free text; may carry PII, so it is withheld alongside the
    /// identity fields while the profile is locked.
    pub summary: Option<String>,

    pub experience_level: ExperienceLevel,

    /// Free-text location; bucketed by the normalizer for filtering.
    pub location: Option<String>,

    pub remote_preference: RemotePreference,
    pub availability: Availability,

    /// Annual salary expectation range. Invariant: min <= max when both set.
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub currency: Option<String>,

    /// When true, identity/contact data requires an unlock to view.
    pub is_anonymized: bool,

    /// Inactive profiles never appear in search results.
    pub is_active: bool,

    pub updated_at: DateTime<Utc>,
}

/// A tag attached to a candidate (join of the association and the tag row).
#[derive(Debug, Clone, FromRow)]
pub struct CandidateTag {
    pub candidate_id: Uuid,
    pub tag_id: Uuid,
    pub name: String,
    pub category: TagCategory,

    /// Optional self-reported proficiency, e.g. "expert".
    pub proficiency: Option<String>,

    pub years_experience: Option<i32>,

    /// Admin-verified tags; the only mutable bit of a tag.
    pub is_verified: bool,
}

/// A candidate profile together with its tag associations, as consumed by
/// the scoring engine and facet aggregator.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub profile: CandidateProfile,
    pub tags: Vec<CandidateTag>,
}

/// Append-only unlock fact, unique on (company_id, candidate_id).
///
/// Sole source of truth for "has this company already paid to see this
/// candidate". Never deleted, never re-charged.
#[derive(Debug, Clone, FromRow)]
pub struct UnlockRecord {
    pub company_id: Uuid,
    pub candidate_id: Uuid,
    pub credits_spent: i64,
    pub unlocked_at: DateTime<Utc>,
}

/// Per-company credit balance.
///
/// Mutated only by billing top-ups (out of band) and by the atomic
/// debit-and-record transaction. Balance never goes negative; the database
/// enforces this with a CHECK constraint on top of the conditional debit.
#[derive(Debug, Clone, FromRow)]
pub struct CreditLedger {
    pub company_id: Uuid,
    pub balance: i64,
    pub updated_at: DateTime<Utc>,
}
