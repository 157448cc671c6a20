use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::{Datelike, Utc};

use pandu_db::queries::ProfileUpdate;
use pandu_types::api::{Certificate, Claims, MembershipCard, UpdateProfileRequest};
use pandu_types::models::Member;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn show(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(own_member(&state, &claims)?))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let display_name = req.display_name.trim();
    if display_name.is_empty() {
        return Err(ApiError::EmptyDisplayName);
    }

    state.db.update_profile(
        claims.sub,
        &ProfileUpdate {
            display_name,
            email: req.email.as_deref(),
            student_id: req.student_id.as_deref(),
            class: req.class.as_deref(),
            whatsapp: req.whatsapp.as_deref(),
        },
    )?;

    Ok(Json(own_member(&state, &claims)?))
}

/// Derived membership-card view; nothing is stored for it.
pub async fn card(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let member = own_member(&state, &claims)?;
    Ok(Json(MembershipCard {
        member_no: format!("IPM-{}-{:04}", member.created_at.year(), member.id),
        handle: member.handle,
        display_name: member.display_name,
        class: member.class,
        role: member.role,
        member_since: member.created_at.date_naive(),
    }))
}

pub async fn certificate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let member = own_member(&state, &claims)?;
    Ok(Json(Certificate {
        certificate_no: format!("PIAGAM/{}/{:04}", member.created_at.year(), member.id),
        display_name: member.display_name,
        role: member.role,
        member_since: member.created_at.date_naive(),
        issued_at: Utc::now(),
    }))
}

fn own_member(state: &AppState, claims: &Claims) -> Result<Member, ApiError> {
    // A valid token for a since-deleted member resolves to 404.
    Ok(state
        .db
        .member_by_id(claims.sub)?
        .ok_or(ApiError::NotFound)?
        .into_member())
}
