use anyhow::Result;
use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{extractors::AppState, AuthenticatedUser, AuthError};
use crate::models::User;
use crate::repositories::user_repository::UserRepository;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
    /// Allowlist membership at sign-in time, informational only. Admin
    /// routes re-verify it on every request.
    pub is_admin: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/login", post(login))
        .route("/profile", get(get_profile));

    Ok(router)
}

async fn login(
    State(app_state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    // Validate request
    req.validate().map_err(|_| AuthError::InvalidCredentials)?;

    let user_repo = UserRepository::new(app_state.database.pool().clone());

    // Find user by email
    let user = user_repo
        .find_by_email(&req.email)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::InvalidCredentials)?;

    // Verify password
    let is_valid = verify_password(&req.password, &user.password_hash)
        .map_err(|_| AuthError::InvalidCredentials)?;

    if !is_valid {
        return Err(AuthError::InvalidCredentials);
    }

    let is_admin = user_repo
        .is_admin(&user.email)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

    // Generate JWT token
    let token = app_state
        .jwt_service
        .create_token_for_user(user.id, user.email.clone())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(Json(AuthResponse {
        token,
        user: UserInfo::from(user),
        is_admin,
    }))
}

async fn get_profile(auth_user: AuthenticatedUser) -> Result<Json<UserInfo>, AuthError> {
    Ok(Json(UserInfo::from(auth_user.user)))
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Password hash parsing failed: {}", e))?;
    let argon2 = Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};

    #[test]
    fn test_password_verification() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"correct horse", &salt)
            .unwrap()
            .to_string();

        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
