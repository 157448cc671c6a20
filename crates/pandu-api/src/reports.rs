use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use pandu_types::api::{Claims, SubmitReportRequest};
use pandu_types::models::{Report, Role};

use crate::error::ApiError;
use crate::middleware::require_role;
use crate::state::AppState;

pub async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return Err(ApiError::EmptyMessage);
    }

    let now = Utc::now();
    let id = state
        .db
        .insert_report(claims.sub, &claims.display_name, &message, now)?;

    Ok((
        StatusCode::CREATED,
        Json(Report {
            id,
            member_id: claims.sub,
            display_name: claims.display_name.clone(),
            message,
            submitted_at: now,
        }),
    ))
}

/// Staff see the whole queue; a regular member sees only their own.
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = if claims.role >= Role::Moderator {
        state.db.list_reports()?
    } else {
        state.db.list_reports_for(claims.sub)?
    };
    let reports: Vec<Report> = rows.into_iter().map(|r| r.into_report()).collect();
    Ok(Json(reports))
}

/// Resolution deletes the report; the lifecycle has no other transition.
pub async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Moderator)?;
    state.db.delete_report(id)?;
    Ok(StatusCode::NO_CONTENT)
}
