use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    pub sub: Uuid, // User ID (subject)
    pub email: String,
    pub exp: i64, // Expiration time (Unix timestamp)
    pub iat: i64, // Issued at (Unix timestamp)
}

impl TokenClaims {
    pub fn new(user_id: Uuid, email: String, expires_in: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email,
            exp: (now + expires_in).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_claims_are_not_expired() {
        let claims = TokenClaims::new(Uuid::new_v4(), "a@b.c".to_string(), Duration::hours(1));
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_past_claims_are_expired() {
        let claims = TokenClaims::new(Uuid::new_v4(), "a@b.c".to_string(), Duration::hours(-1));
        assert!(claims.is_expired());
    }
}
