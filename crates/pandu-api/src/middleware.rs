use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use pandu_types::api::Claims;
use pandu_types::models::Role;

use crate::error::ApiError;
use crate::state::AppState;

/// Extract and validate the JWT from the Authorization header. The signing
/// secret comes from the application state, not the environment.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthenticated)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthenticated)?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}

/// The role gate: member < moderator < admin.
pub fn require_role(claims: &Claims, min: Role) -> Result<(), ApiError> {
    if claims.role >= min {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: 7,
            handle: "budi".into(),
            display_name: "Budi".into(),
            role,
            exp: 0,
        }
    }

    #[test]
    fn role_gate_is_ordered() {
        assert!(require_role(&claims(Role::Member), Role::Member).is_ok());
        assert!(require_role(&claims(Role::Member), Role::Moderator).is_err());
        assert!(require_role(&claims(Role::Moderator), Role::Moderator).is_ok());
        assert!(require_role(&claims(Role::Moderator), Role::Admin).is_err());
        assert!(require_role(&claims(Role::Admin), Role::Member).is_ok());
    }
}
