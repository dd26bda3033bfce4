use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A sign-in account. Admin privilege is not a property of the account;
/// it is a separate allowlist check performed on every privileged request.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
