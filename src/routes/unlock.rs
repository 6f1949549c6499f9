//! Unlock Endpoints
//!
//! Explicit unlock requests only — viewing search results never triggers a
//! charge. The POST handler delegates to the unlock service, which treats
//! the debit-plus-record transaction as non-interruptible; the GET probes
//! exist so the UI can render lock badges and balances without risking a
//! debit.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::LedgerStore;
use crate::error::ApiError;
use crate::services::unlock as unlock_service;
use crate::AppState;

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub company_id: Uuid,
    pub candidate_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    pub unlocked: bool,
    /// Zero on idempotent replays and for public profiles.
    pub credits_spent: i64,
    pub remaining_balance: i64,
    pub unlocked_at: String,
}

#[derive(Debug, Serialize)]
pub struct UnlockStatusResponse {
    pub company_id: Uuid,
    pub candidate_id: Uuid,
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_spent: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub company_id: Uuid,
    pub balance: i64,
}

// ============ Handlers ============

/// POST /api/unlock
pub async fn unlock(
    State(state): State<AppState>,
    Json(req): Json<UnlockRequest>,
) -> Result<Json<UnlockResponse>, ApiError> {
    let outcome = unlock_service::unlock(
        &*state.db,
        &*state.db,
        req.company_id,
        req.candidate_id,
        state.config.unlock_credit_cost,
    )
    .await?;

    Ok(Json(UnlockResponse {
        unlocked: outcome.unlocked,
        credits_spent: outcome.credits_spent,
        remaining_balance: outcome.remaining_balance,
        unlocked_at: outcome.unlocked_at.to_rfc3339(),
    }))
}

/// GET /api/unlock/:company_id/:candidate_id
pub async fn unlock_status(
    State(state): State<AppState>,
    Path((company_id, candidate_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<UnlockStatusResponse>, ApiError> {
    let record = state.db.get_unlock_record(company_id, candidate_id).await?;

    Ok(Json(match record {
        Some(record) => UnlockStatusResponse {
            company_id,
            candidate_id,
            unlocked: true,
            credits_spent: Some(record.credits_spent),
            unlocked_at: Some(record.unlocked_at.to_rfc3339()),
        },
        None => UnlockStatusResponse {
            company_id,
            candidate_id,
            unlocked: false,
            credits_spent: None,
            unlocked_at: None,
        },
    }))
}

/// GET /api/balance/:company_id
pub async fn balance(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state
        .db
        .get_credit_balance(company_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("company".to_string()))?;

    Ok(Json(BalanceResponse {
        company_id,
        balance,
    }))
}
