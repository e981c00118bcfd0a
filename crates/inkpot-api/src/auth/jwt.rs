//! JWT session tokens
//!
//! Stateless HS256 tokens carrying the user id and email. The signing secret
//! comes from configuration and is required at startup.

use chrono::Utc;
use inkpot_core::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the user's id
    pub sub: Uuid,
    pub email: String,
    /// Expiry, seconds since epoch
    pub exp: i64,
    /// Issued at, seconds since epoch
    pub iat: i64,
}

pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    email: &str,
    expiry_hours: i64,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user_id,
        email: email.to_string(),
        exp: (now + chrono::Duration::hours(expiry_hours)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign session token: {e}")))
}

pub fn verify_token(secret: &str, token: &str) -> Result<JwtClaims, AppError> {
    decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired session token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_token("test-secret", user_id, "a@b.co", 24).expect("issue");
        let claims = verify_token("test-secret", &token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@b.co");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token("secret-a", Uuid::new_v4(), "a@b.co", 24).expect("issue");
        assert!(verify_token("secret-b", &token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token("test-secret", Uuid::new_v4(), "a@b.co", -1).expect("issue");
        assert!(verify_token("test-secret", &token).is_err());
    }
}
