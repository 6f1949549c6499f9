//! Scoring & Ranking Engine
//!
//! Pure, CPU-bound ranking over an already-fetched candidate snapshot.
//! Hard filters eliminate candidates outright (AND'd); survivors get a
//! weighted relevance score. Ordering is fully deterministic — equal
//! scores fall back to `updated_at` descending, then `id` ascending — so
//! repeating an identical query pages through the same sequence.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::ScoringWeights;
use crate::db::Candidate;
use crate::services::normalizer::{location_bucket, SearchQuery};
use crate::types::SortKey;

/// Recency bonus steps: profiles updated within a week score full marks,
/// falling off to nothing past ninety days.
const RECENCY_STEPS: [(i64, f64); 3] = [(7, 1.0), (30, 0.5), (90, 0.25)];

/// A filter dimension, named so the facet aggregator can apply every
/// filter except the one being faceted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDimension {
    Tags,
    Experience,
    Remote,
    Availability,
    Location,
    Salary,
}

/// One ranked search hit.
#[derive(Debug, Clone)]
pub struct RankedHit {
    pub candidate_id: Uuid,
    pub score: f64,
    /// Names of the required/optional tags this candidate matched.
    pub matched_tags: Vec<String>,
}

/// One page of ranked results plus pagination metadata computed over the
/// full filtered set.
#[derive(Debug, Clone)]
pub struct RankedPage {
    pub hits: Vec<RankedHit>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// Does `candidate` pass every hard filter of `query`, optionally skipping
/// one dimension? `skip` is only used by the facet aggregator.
pub fn passes_filters(
    candidate: &Candidate,
    query: &SearchQuery,
    skip: Option<FilterDimension>,
) -> bool {
    let profile = &candidate.profile;

    if !profile.is_active {
        return false;
    }

    if skip != Some(FilterDimension::Tags) {
        let has = |id: &Uuid| candidate.tags.iter().any(|t| t.tag_id == *id);
        if query.excluded_tags.iter().any(has) {
            return false;
        }
        // Required tags are hard, not soft: missing any one excludes.
        if !query.required_tags.iter().all(has) {
            return false;
        }
    }

    if skip != Some(FilterDimension::Experience)
        && !query.experience_levels.is_empty()
        && !query.experience_levels.contains(&profile.experience_level)
    {
        return false;
    }

    if skip != Some(FilterDimension::Remote)
        && !query.remote_preferences.is_empty()
        && !query.remote_preferences.contains(&profile.remote_preference)
    {
        return false;
    }

    if skip != Some(FilterDimension::Availability)
        && !query.availability.is_empty()
        && !query.availability.contains(&profile.availability)
    {
        return false;
    }

    if skip != Some(FilterDimension::Location) && !query.locations.is_empty() {
        let bucket = profile.location.as_deref().map(location_bucket);
        match bucket {
            Some(b) if query.locations.contains(&b) => {}
            _ => return false,
        }
    }

    if skip != Some(FilterDimension::Salary)
        && (query.salary_min.is_some() || query.salary_max.is_some())
        && !salary_overlaps(profile.salary_min, profile.salary_max, query)
    {
        return false;
    }

    true
}

/// Range-overlap check between the candidate's expectation band and the
/// query band. A candidate with no salary data at all does not match an
/// active salary filter.
fn salary_overlaps(c_min: Option<i64>, c_max: Option<i64>, query: &SearchQuery) -> bool {
    if c_min.is_none() && c_max.is_none() {
        return false;
    }
    let c_low = c_min.unwrap_or(i64::MIN);
    let c_high = c_max.unwrap_or(i64::MAX);
    let q_low = query.salary_min.unwrap_or(i64::MIN);
    let q_high = query.salary_max.unwrap_or(i64::MAX);
    c_low <= q_high && q_low <= c_high
}

/// Weighted relevance score and the matched tag names.
///
/// Score = w_required * required_ratio + w_optional * optional_ratio
///       + w_text * text_relevance + w_recency * recency_bonus
///
/// `required_ratio` is 1.0 whenever required tags were requested (the hard
/// filter already removed partial matches) and 0.0 otherwise.
pub fn score_candidate(
    candidate: &Candidate,
    query: &SearchQuery,
    weights: &ScoringWeights,
    now: DateTime<Utc>,
) -> (f64, Vec<String>) {
    let mut matched_tags = Vec::new();

    let required_ratio = if query.required_tags.is_empty() {
        0.0
    } else {
        for id in &query.required_tags {
            if let Some(tag) = candidate.tags.iter().find(|t| t.tag_id == *id) {
                matched_tags.push(tag.name.clone());
            }
        }
        1.0
    };

    let optional_ratio = if query.optional_tags.is_empty() {
        0.0
    } else {
        let mut matched = 0usize;
        for id in &query.optional_tags {
            if let Some(tag) = candidate.tags.iter().find(|t| t.tag_id == *id) {
                matched_tags.push(tag.name.clone());
                matched += 1;
            }
        }
        matched as f64 / query.optional_tags.len() as f64
    };

    let text_relevance = match &query.text {
        Some(text) => text_match_ratio(candidate, text),
        None => 0.0,
    };

    let recency_bonus = recency_bonus(candidate.profile.updated_at, now);

    let score = weights.required * required_ratio
        + weights.optional * optional_ratio
        + weights.text * text_relevance
        + weights.recency * recency_bonus;

    (score, matched_tags)
}

/// Fraction of query tokens found (case-insensitive substring) across
/// title, summary and tag names.
fn text_match_ratio(candidate: &Candidate, text: &str) -> f64 {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return 0.0;
    }

    let mut haystack = candidate.profile.title.to_lowercase();
    if let Some(summary) = &candidate.profile.summary {
        haystack.push(' ');
        haystack.push_str(&summary.to_lowercase());
    }
    for tag in &candidate.tags {
        haystack.push(' ');
        haystack.push_str(&tag.name.to_lowercase());
    }

    let matched = tokens.iter().filter(|t| haystack.contains(**t)).count();
    matched as f64 / tokens.len() as f64
}

fn recency_bonus(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_days = (now - updated_at).num_days();
    for (cutoff, bonus) in RECENCY_STEPS {
        if age_days <= cutoff {
            return bonus;
        }
    }
    0.0
}

/// Filter, score, order and paginate the candidate snapshot.
pub fn rank(
    query: &SearchQuery,
    candidates: &[Candidate],
    weights: &ScoringWeights,
    now: DateTime<Utc>,
) -> RankedPage {
    let mut scored: Vec<(&Candidate, f64, Vec<String>)> = candidates
        .iter()
        .filter(|c| passes_filters(c, query, None))
        .map(|c| {
            let (score, matched) = score_candidate(c, query, weights, now);
            (c, score, matched)
        })
        .collect();

    // Non-relevance sort keys bypass scoring for ordering; the score is
    // still reported per hit. Every mode ends on id ascending.
    match query.sort {
        SortKey::Relevance => scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.0.profile.updated_at.cmp(&a.0.profile.updated_at))
                .then_with(|| a.0.profile.id.cmp(&b.0.profile.id))
        }),
        SortKey::Salary => scored.sort_by(|a, b| {
            // Descending by salary_max; candidates without one sort last.
            b.0.profile
                .salary_max
                .cmp(&a.0.profile.salary_max)
                .then_with(|| a.0.profile.id.cmp(&b.0.profile.id))
        }),
        SortKey::Experience => scored.sort_by(|a, b| {
            b.0.profile
                .experience_level
                .rank()
                .cmp(&a.0.profile.experience_level.rank())
                .then_with(|| a.0.profile.id.cmp(&b.0.profile.id))
        }),
        SortKey::Alphabetical => scored.sort_by(|a, b| {
            a.0.profile
                .title
                .to_lowercase()
                .cmp(&b.0.profile.title.to_lowercase())
                .then_with(|| a.0.profile.id.cmp(&b.0.profile.id))
        }),
        SortKey::Updated => scored.sort_by(|a, b| {
            b.0.profile
                .updated_at
                .cmp(&a.0.profile.updated_at)
                .then_with(|| a.0.profile.id.cmp(&b.0.profile.id))
        }),
    }

    let total = scored.len() as u64;
    let limit = query.limit.max(1);
    let page = query.page.max(1);
    let total_pages = total.div_ceil(limit as u64);
    let skip = (page as usize - 1) * limit as usize;

    let hits = scored
        .into_iter()
        .skip(skip)
        .take(limit as usize)
        .map(|(c, score, matched_tags)| RankedHit {
            candidate_id: c.profile.id,
            score,
            matched_tags,
        })
        .collect();

    RankedPage {
        hits,
        total,
        page,
        limit,
        total_pages,
    }
}
