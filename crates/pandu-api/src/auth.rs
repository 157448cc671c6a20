use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};

use pandu_db::queries::NewMember;
use pandu_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use pandu_types::models::Role;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = req.handle.trim().to_lowercase();
    if handle.len() < 3 || handle.len() > 32 {
        return Err(ApiError::InvalidHandle);
    }
    if req.password.len() < 6 {
        return Err(ApiError::WeakPassword);
    }
    let display_name = req.display_name.trim();
    if display_name.is_empty() {
        return Err(ApiError::EmptyDisplayName);
    }

    let password_hash = hash_password(&req.password)?;

    // The UNIQUE constraint on handle decides the race; no prior lookup.
    let member_id = state.db.create_member(
        &NewMember {
            handle: &handle,
            password_hash: &password_hash,
            display_name,
            email: req.email.as_deref(),
            student_id: req.student_id.as_deref(),
            class: req.class.as_deref(),
            whatsapp: req.whatsapp.as_deref(),
        },
        chrono::Utc::now(),
    )?;

    let token = create_token(&state.jwt_secret, member_id, &handle, display_name, Role::Member)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { member_id, token }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = req.handle.trim().to_lowercase();
    let row = state
        .db
        .member_by_handle(&handle)?
        .ok_or(ApiError::InvalidCredentials)?;

    verify_password(&req.password, &row.password)?;

    let member = row.into_member();
    let token = create_token(
        &state.jwt_secret,
        member.id,
        &member.handle,
        &member.display_name,
        member.role,
    )?;

    Ok(Json(LoginResponse {
        member_id: member.id,
        display_name: member.display_name,
        role: member.role,
        token,
    }))
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> Result<(), ApiError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash unparsable: {e}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::InvalidCredentials)
}

pub fn create_token(
    secret: &str,
    member_id: i64,
    handle: &str,
    display_name: &str,
    role: Role,
) -> Result<String, ApiError> {
    let claims = Claims {
        sub: member_id,
        handle: handle.to_string(),
        display_name: display_name.to_string(),
        role,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("token signing failed: {e}")))?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("pass123").unwrap();
        assert!(verify_password("pass123", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash).unwrap_err(),
            ApiError::InvalidCredentials
        ));
    }

    #[test]
    fn token_carries_identity_and_role() {
        let token = create_token("secret", 7, "budi", "Budi Santoso", Role::Moderator).unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, 7);
        assert_eq!(data.claims.handle, "budi");
        assert_eq!(data.claims.role, Role::Moderator);
    }
}
