//! Search Endpoint
//!
//! One request runs the whole read-only pipeline: normalize the raw filter
//! input, fetch the active-candidate snapshot, rank, aggregate facets, and
//! redact each hit's preview according to the viewer's unlock state.
//! Search never mutates anything, so callers may retry freely.

use std::collections::{HashMap, HashSet};

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{CandidateStore, LedgerStore};
use crate::error::ApiError;
use crate::services::facets::{self, Facets};
use crate::services::normalizer::{self, RawSearchRequest};
use crate::services::scoring;
use crate::services::unlock::{preview, visibility, CandidatePreview, Viewer};
use crate::AppState;

// ============ Request/Response Types ============

/// Search request: filter input plus viewer context. The surrounding app
/// authenticates the caller; this core trusts the supplied identity.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub filters: RawSearchRequest,

    /// Viewing company, used for unlock-state redaction.
    pub company_id: Option<Uuid>,
    /// Viewing user; profile owners see their own data unredacted.
    pub viewer_id: Option<Uuid>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub candidate_id: Uuid,
    pub score: f64,
    pub matched_tags: Vec<String>,
    pub preview: CandidatePreview,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub facets: Facets,
    pub search_time_ms: u64,
}

// ============ Handler ============

/// POST /api/search
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let started = std::time::Instant::now();

    let query = normalizer::normalize(&req.filters).map_err(ApiError::Validation)?;

    // One consistent snapshot feeds both ranking and facet aggregation.
    let candidates = state.db.get_active_candidates().await?;

    let ranked = scoring::rank(&query, &candidates, &state.config.weights, chrono::Utc::now());
    let facets = facets::aggregate(&query, &candidates);

    let viewer = Viewer {
        company_id: req.company_id,
        viewer_id: req.viewer_id,
        is_admin: req.is_admin,
    };
    let unlocked: HashSet<Uuid> = match req.company_id {
        Some(company_id) => state.db.get_unlocked_ids(company_id).await?,
        None => HashSet::new(),
    };

    let by_id: HashMap<Uuid, _> = candidates.iter().map(|c| (c.profile.id, c)).collect();
    let results = ranked
        .hits
        .into_iter()
        .filter_map(|hit| {
            by_id.get(&hit.candidate_id).map(|candidate| SearchHit {
                candidate_id: hit.candidate_id,
                score: hit.score,
                matched_tags: hit.matched_tags,
                preview: preview(candidate, visibility(&viewer, candidate, &unlocked)),
            })
        })
        .collect();

    tracing::debug!(
        total = ranked.total,
        page = ranked.page,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "search completed"
    );

    Ok(Json(SearchResponse {
        results,
        total: ranked.total,
        page: ranked.page,
        limit: ranked.limit,
        total_pages: ranked.total_pages,
        facets,
        search_time_ms: started.elapsed().as_millis() as u64,
    }))
}
