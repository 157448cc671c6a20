use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use pandu_types::api::{BalanceResponse, Claims, RecordEntryRequest};
use pandu_types::models::LedgerEntry;

use crate::error::ApiError;
use crate::middleware::require_role;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let entries: Vec<LedgerEntry> = state
        .db
        .list_ledger_entries()?
        .into_iter()
        .map(|r| r.into_entry())
        .collect();
    Ok(Json(entries))
}

pub async fn balance(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let (income, expense) = state.db.ledger_totals()?;
    Ok(Json(BalanceResponse {
        income,
        expense,
        balance: income - expense,
    }))
}

/// Append-only: no update or delete exists for any role.
pub async fn record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RecordEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, state.ledger_write_role)?;

    if req.amount <= 0 {
        return Err(ApiError::InvalidAmount);
    }
    let memo = req.memo.trim().to_string();

    let now = Utc::now();
    let id = state
        .db
        .insert_ledger_entry(req.direction.as_str(), req.amount, &memo, now)?;

    Ok((
        StatusCode::CREATED,
        Json(LedgerEntry {
            id,
            direction: req.direction,
            amount: req.amount,
            memo,
            created_at: now,
        }),
    ))
}
