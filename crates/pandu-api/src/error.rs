use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use pandu_db::StoreError;

/// API-level error taxonomy. Every variant maps to a stable status code;
/// none is fatal to the process.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("insufficient role")]
    Forbidden,

    #[error("invalid handle or password")]
    InvalidCredentials,

    #[error("handle must be 3-32 characters")]
    InvalidHandle,

    #[error("password must be at least 6 characters")]
    WeakPassword,

    #[error("display name must not be empty")]
    EmptyDisplayName,

    #[error("handle already taken")]
    DuplicateHandle,

    #[error("amount must be a positive integer")]
    InvalidAmount,

    #[error("report message must not be empty")]
    EmptyMessage,

    #[error("already checked in today")]
    AlreadyCheckedIn,

    #[error("not found")]
    NotFound,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateHandle => ApiError::DuplicateHandle,
            StoreError::AlreadyCheckedIn => ApiError::AlreadyCheckedIn,
            StoreError::NotFound => ApiError::NotFound,
            StoreError::RootAdmin => ApiError::Forbidden,
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::InvalidHandle
            | ApiError::WeakPassword
            | ApiError::EmptyDisplayName
            | ApiError::InvalidAmount
            | ApiError::EmptyMessage => StatusCode::BAD_REQUEST,
            ApiError::DuplicateHandle | ApiError::AlreadyCheckedIn => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Storage faults are logged, never leaked to the client.
            ApiError::Internal(err) => {
                error!("internal error: {err:#}");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
