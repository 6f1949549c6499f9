//! Access Control / Unlock Service
//!
//! Per (company, candidate) pair, profile visibility is a one-way state
//! machine: `Locked` until an unlock record exists, then `Unlocked`
//! forever. Non-anonymized profiles are effectively public and never cost
//! a credit. Admins and the profile's own owner bypass the ledger
//! entirely — a bypass, not a state transition.
//!
//! The unlock transition debits credits and writes the unlock record as
//! one atomic unit in the ledger store; retries and concurrent races
//! resolve idempotently with zero additional spend.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{Candidate, CandidateStore, DebitOutcome, LedgerStore};
use crate::error::ApiError;
use crate::services::normalizer::location_bucket;
use crate::types::{Availability, ExperienceLevel, RemotePreference, TagCategory};

/// Who is looking.
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewer {
    pub company_id: Option<Uuid>,
    pub viewer_id: Option<Uuid>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Full,
    Redacted,
}

/// Candidate data as returned in search results. Identity and contact
/// fields are `None` while the profile is locked for this viewer.
#[derive(Debug, Clone, Serialize)]
pub struct CandidatePreview {
    pub candidate_id: Uuid,
    pub is_anonymized: bool,
    /// True when this viewer sees the profile unredacted.
    pub unlocked: bool,

    // ---- PII, present only when unlocked ----
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    // ---- Always visible ----
    pub title: String,
    pub experience_level: ExperienceLevel,
    pub remote_preference: RemotePreference,
    pub availability: Availability,
    /// Region bucket only; the raw free-text location may identify someone.
    pub location: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub currency: Option<String>,
    pub tags: Vec<PreviewTag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewTag {
    pub name: String,
    pub category: TagCategory,
    pub is_verified: bool,
}

/// Result of an unlock request. `credits_spent` is zero on idempotent
/// replays and for public (non-anonymized) profiles.
#[derive(Debug, Clone, Serialize)]
pub struct UnlockOutcome {
    pub unlocked: bool,
    pub credits_spent: i64,
    pub remaining_balance: i64,
    pub unlocked_at: DateTime<Utc>,
}

/// Decide what this viewer may see of the candidate.
pub fn visibility(viewer: &Viewer, candidate: &Candidate, unlocked: &HashSet<Uuid>) -> Visibility {
    let profile = &candidate.profile;

    if !profile.is_anonymized {
        return Visibility::Full;
    }
    if viewer.is_admin {
        return Visibility::Full;
    }
    if viewer.viewer_id == Some(profile.user_id) {
        return Visibility::Full;
    }
    if viewer.company_id.is_some() && unlocked.contains(&profile.id) {
        return Visibility::Full;
    }
    Visibility::Redacted
}

/// Build the search-result preview, redacting PII unless `Full`.
pub fn preview(candidate: &Candidate, vis: Visibility) -> CandidatePreview {
    let profile = &candidate.profile;
    let full = vis == Visibility::Full;

    CandidatePreview {
        candidate_id: profile.id,
        is_anonymized: profile.is_anonymized,
        unlocked: full,
        name: if full { profile.name.clone() } else { None },
        email: if full { profile.email.clone() } else { None },
        phone: if full { profile.phone.clone() } else { None },
        linkedin_url: if full { profile.linkedin_url.clone() } else { None },
        github_url: if full { profile.github_url.clone() } else { None },
        portfolio_url: if full { profile.portfolio_url.clone() } else { None },
        image_url: if full { profile.image_url.clone() } else { None },
        summary: if full { profile.summary.clone() } else { None },
        title: profile.title.clone(),
        experience_level: profile.experience_level,
        remote_preference: profile.remote_preference,
        availability: profile.availability,
        location: profile.location.as_deref().map(location_bucket),
        salary_min: profile.salary_min,
        salary_max: profile.salary_max,
        currency: profile.currency.clone(),
        tags: candidate
            .tags
            .iter()
            .map(|t| PreviewTag {
                name: t.name.clone(),
                category: t.category,
                is_verified: t.is_verified,
            })
            .collect(),
    }
}

/// Execute an unlock request.
///
/// # State machine
///
/// - Candidate unknown, or inactive with no prior unlock -> `NotFound`.
/// - Company without a ledger row -> `NotFound`.
/// - Non-anonymized candidate -> success, zero spend, no record written.
/// - Existing record (including concurrent race losers) -> success,
///   `credits_spent = 0`.
/// - Otherwise the store debits and records atomically; insufficient
///   balance fails with no state change.
pub async fn unlock<C, L>(
    candidates: &C,
    ledger: &L,
    company_id: Uuid,
    candidate_id: Uuid,
    cost: i64,
) -> Result<UnlockOutcome, ApiError>
where
    C: CandidateStore + ?Sized,
    L: LedgerStore + ?Sized,
{
    let candidate = candidates
        .get_candidate(candidate_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("candidate".to_string()))?;

    let balance = ledger
        .get_credit_balance(company_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("company".to_string()))?;

    let existing = ledger.get_unlock_record(company_id, candidate_id).await?;

    if let Some(record) = existing {
        // Already paid for; stays valid even if the profile went inactive.
        return Ok(UnlockOutcome {
            unlocked: true,
            credits_spent: 0,
            remaining_balance: balance,
            unlocked_at: record.unlocked_at,
        });
    }

    if !candidate.profile.is_active {
        return Err(ApiError::NotFound("candidate".to_string()));
    }

    if !candidate.profile.is_anonymized {
        // Public profile: nothing to unlock, nothing to charge.
        return Ok(UnlockOutcome {
            unlocked: true,
            credits_spent: 0,
            remaining_balance: balance,
            unlocked_at: Utc::now(),
        });
    }

    match ledger
        .debit_and_record_unlock(company_id, candidate_id, cost)
        .await?
    {
        DebitOutcome::Debited {
            record,
            remaining_balance,
        } => {
            tracing::info!(
                %company_id,
                %candidate_id,
                credits_spent = record.credits_spent,
                remaining_balance,
                "profile unlocked"
            );
            Ok(UnlockOutcome {
                unlocked: true,
                credits_spent: record.credits_spent,
                remaining_balance,
                unlocked_at: record.unlocked_at,
            })
        }
        DebitOutcome::AlreadyUnlocked(record) => {
            // Race resolved idempotently: the first writer charged, we
            // report the existing fact with zero additional spend.
            tracing::debug!(
                %company_id,
                %candidate_id,
                "unlock race lost, returning existing record"
            );
            let balance = ledger
                .get_credit_balance(company_id)
                .await?
                .unwrap_or(0);
            Ok(UnlockOutcome {
                unlocked: true,
                credits_spent: 0,
                remaining_balance: balance,
                unlocked_at: record.unlocked_at,
            })
        }
        DebitOutcome::InsufficientCredits { balance } => Err(ApiError::InsufficientCredits {
            required: cost,
            balance,
        }),
    }
}
