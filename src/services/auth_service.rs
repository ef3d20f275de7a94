use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Bearer tokens issued by the mock auth server live for 24 hours.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Password hashing and HMAC-signed token issuance for the dev auth server.
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var("MOCK_AUTH_JWT_SECRET")
                .unwrap_or_else(|_| "dev-only-not-a-secret".to_string()),
        )
    }

    /// At least 8 characters with an uppercase letter, a lowercase letter
    /// and a digit.
    pub fn check_password_policy(password: &str) -> Result<(), AppError> {
        let long_enough = password.chars().count() >= 8;
        let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        if long_enough && has_upper && has_lower && has_digit {
            Ok(())
        } else {
            Err(AppError::Validation(
                "Password must be at least 8 characters and contain an uppercase letter, \
                 a lowercase letter and a digit"
                    .to_string(),
            ))
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Stored hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn issue_token(&self, user_id: Uuid, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
            iat: now.timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_policy_accepts_and_rejects() {
        assert!(AuthService::check_password_policy("Abcdef12").is_ok());
        assert!(AuthService::check_password_policy("short1A").is_err());
        assert!(AuthService::check_password_policy("alllowercase1").is_err());
        assert!(AuthService::check_password_policy("ALLUPPERCASE1").is_err());
        assert!(AuthService::check_password_policy("NoDigitsHere").is_err());
    }

    #[test]
    fn hash_then_verify_round_trip() {
        let service = AuthService::new("test-secret");
        let hash = service.hash_password("Sup3rSecret").unwrap();
        assert!(service.verify_password("Sup3rSecret", &hash).unwrap());
        assert!(!service.verify_password("WrongPass1", &hash).unwrap());
    }

    #[test]
    fn token_round_trip_carries_claims() {
        let service = AuthService::new("test-secret");
        let user_id = Uuid::new_v4();
        let token = service.issue_token(user_id, "a@b.test").unwrap();
        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "a@b.test");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = AuthService::new("test-secret");
        let other = AuthService::new("different-secret");
        let token = service.issue_token(Uuid::new_v4(), "a@b.test").unwrap();
        assert!(other.verify_token(&token).is_err());
    }
}
