use crate::auth::{claims::TokenClaims, errors::AuthError, jwt::JwtService};
use crate::database::Database;
use crate::models::User;
use crate::repositories::user_repository::UserRepository;
use crate::services::{finder::PaperFinder, storage::StorageClient};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub storage: Arc<StorageClient>,
    pub finder: Arc<PaperFinder>,
    pub jwt_service: JwtService,
    pub config: crate::config::AppConfig,
    pub startup_time: Instant,
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    #[allow(dead_code)]
    pub claims: TokenClaims,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token_from_auth_header(&parts.headers)?;
        extract_authenticated_user(state, &token).await
    }
}

// Admin extractor. The allowlist is consulted against the database on every
// request; a token or a previously-granted session never stands in for it.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        debug!("Attempting to extract AdminUser from request");

        let token = extract_token_from_auth_header(&parts.headers)?;
        let auth_user = extract_authenticated_user(state, &token).await?;

        let user_repo = UserRepository::new(state.database.pool().clone());
        let is_admin = user_repo
            .is_admin(&auth_user.user.email)
            .await
            .map_err(|e| {
                error!("Database error during allowlist check: {:?}", e);
                AuthError::DatabaseError(e.to_string())
            })?;

        if !is_admin {
            warn!(
                "User {} attempted to access an admin endpoint without allowlist entry",
                auth_user.user.email
            );
            return Err(AuthError::NotAnAdmin);
        }

        debug!("AdminUser extracted successfully for {}", auth_user.user.email);
        Ok(AdminUser(auth_user))
    }
}

fn extract_token_from_auth_header(headers: &axum::http::HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    if let Some(token) = auth_header.strip_prefix("Bearer ") {
        Ok(token.to_string())
    } else {
        Err(AuthError::InvalidAuthHeader)
    }
}

/// Helper function to extract and validate an authenticated user from a token
async fn extract_authenticated_user(
    state: &AppState,
    token: &str,
) -> Result<AuthenticatedUser, AuthError> {
    debug!("Extracting AuthenticatedUser from request");

    // Decode and validate token
    let claims = state.jwt_service.decode_token(token).map_err(|e| {
        error!("Failed to decode token: {:?}", e);
        AuthError::InvalidToken(e.to_string())
    })?;

    // Check if token is expired
    if claims.is_expired() {
        warn!("Token expired for user ID: {}", claims.sub);
        return Err(AuthError::TokenExpired);
    }

    // Fetch user from database
    let user_repo = UserRepository::new(state.database.pool().clone());
    let user = user_repo
        .get_user(claims.sub)
        .await
        .map_err(|e| {
            error!("Database error while fetching user {}: {:?}", claims.sub, e);
            AuthError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| {
            warn!("User not found for ID: {}", claims.sub);
            AuthError::UserNotFound
        })?;

    debug!("AuthenticatedUser extracted successfully: {}", user.email);
    Ok(AuthenticatedUser { user, claims })
}
