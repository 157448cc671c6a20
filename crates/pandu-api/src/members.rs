use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use pandu_types::api::{AdminOverview, BalanceResponse, Claims, SetRoleRequest};
use pandu_types::models::{Member, Report, Role};

use crate::error::ApiError;
use crate::middleware::require_role;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Moderator)?;
    let members: Vec<Member> = state
        .db
        .list_members()?
        .into_iter()
        .map(|r| r.into_member())
        .collect();
    Ok(Json(members))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Admin)?;
    // The store refuses the root admin regardless of the actor.
    state.db.delete_member(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SetRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Admin)?;
    state.db.set_member_role(id, req.role.as_str())?;

    let member = state
        .db
        .member_by_id(id)?
        .ok_or(ApiError::NotFound)?
        .into_member();
    Ok(Json(member))
}

pub async fn overview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Moderator)?;

    let members: Vec<Member> = state
        .db
        .list_members()?
        .into_iter()
        .map(|r| r.into_member())
        .collect();
    let reports: Vec<Report> = state
        .db
        .list_reports()?
        .into_iter()
        .map(|r| r.into_report())
        .collect();
    let (income, expense) = state.db.ledger_totals()?;

    Ok(Json(AdminOverview {
        members,
        reports,
        ledger: BalanceResponse {
            income,
            expense,
            balance: income - expense,
        },
    }))
}
