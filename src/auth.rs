//! Admin authentication primitives: HS256 bearer tokens and argon2
//! password hashing.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AtelierError;

/// Claims carried by an admin bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin user id.
    pub sub: String,
    pub username: String,
    pub role: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Issues and validates admin tokens.
pub struct JwtManager {
    secret: String,
    token_ttl: Duration,
}

impl JwtManager {
    pub fn new(secret: String, ttl_hours: i64) -> Self {
        JwtManager {
            secret,
            token_ttl: Duration::hours(ttl_hours),
        }
    }

    /// Generate a signed token for the given admin identity.
    pub fn issue(&self, user_id: i32, username: &str, role: &str) -> Result<String, AtelierError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AtelierError::Internal(format!("failed to sign token: {e}")))
    }

    /// Validate a token's signature and expiry and return its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, AtelierError> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AtelierError::TokenExpired,
            _ => AtelierError::Unauthorized("invalid authentication token".to_string()),
        })?;

        Ok(token_data.claims)
    }
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, AtelierError> {
    use argon2::{
        Argon2, PasswordHasher,
        password_hash::{SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AtelierError::Internal(format!("failed to hash password: {e}")))
}

/// Verify a password against a stored hash. Malformed hashes verify false.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 24);

        let token = manager.issue(7, "admin", "admin").unwrap();
        let claims = manager.validate(&token).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Negative TTL puts the expiry well past the default leeway.
        let manager = JwtManager::new("test-secret".to_string(), -2);

        let token = manager.issue(1, "admin", "admin").unwrap();
        let err = manager.validate(&token).unwrap_err();

        assert!(matches!(err, AtelierError::TokenExpired));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtManager::new("secret-a".to_string(), 24);
        let verifier = JwtManager::new("secret-b".to_string(), 24);

        let token = issuer.issue(1, "admin", "admin").unwrap();
        let err = verifier.validate(&token).unwrap_err();

        assert!(matches!(err, AtelierError::Unauthorized(_)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let manager = JwtManager::new("test-secret".to_string(), 24);
        assert!(manager.validate("not-a-token").is_err());
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter2").unwrap();

        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn malformed_hash_verifies_false() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
