//! Static reference lists: the organizational structure and the event
//! agenda. Reads are open to every member; mutation is staff-only.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use pandu_types::api::{AddAgendaEntryRequest, AddDirectoryEntryRequest, Claims};
use pandu_types::models::{AgendaEntry, DirectoryEntry, Role};

use crate::error::ApiError;
use crate::middleware::require_role;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.list_directory()?))
}

pub async fn add(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddDirectoryEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Moderator)?;
    let id = state
        .db
        .insert_directory_entry(&req.name, &req.position, &req.division)?;
    Ok((
        StatusCode::CREATED,
        Json(DirectoryEntry {
            id,
            name: req.name,
            position: req.position,
            division: req.division,
        }),
    ))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Moderator)?;
    state.db.delete_directory_entry(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_agenda(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.list_agenda()?))
}

pub async fn add_agenda(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddAgendaEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Moderator)?;
    let id = state.db.insert_agenda_entry(
        &req.title,
        &req.location,
        &req.scheduled_for.to_string(),
    )?;
    Ok((
        StatusCode::CREATED,
        Json(AgendaEntry {
            id,
            title: req.title,
            location: req.location,
            scheduled_for: req.scheduled_for,
        }),
    ))
}

pub async fn remove_agenda(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Moderator)?;
    state.db.delete_agenda_entry(id)?;
    Ok(StatusCode::NO_CONTENT)
}
