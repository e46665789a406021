//! # auth-adapters
//!
//! Argon2-based implementation of `CredentialHasher` and a
//! jsonwebtoken-based implementation of `TokenIssuer` (HMAC-signed,
//! 24-hour expiry).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domains::{AccountKind, CredentialHasher, DomainError, Result, SessionClaims, TokenIssuer};

/// Sessions last a day; clients re-login after that.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Password hashing via Argon2id with per-password random salts.
#[derive(Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| DomainError::Internal(format!("password hashing failed: {err}")))
    }

    fn verify(&self, secret: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Wire shape of the JWT payload.
#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    /// Account id.
    sub: Uuid,
    email: String,
    /// "traveler" or "guide"; names the collection for the per-request
    /// existence check.
    role: AccountKind,
    iat: i64,
    exp: i64,
}

/// HMAC-signed session tokens.
pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, claims: &SessionClaims) -> Result<String> {
        let now = Utc::now();
        let payload = JwtClaims {
            sub: claims.account_id,
            email: claims.email.clone(),
            role: claims.kind,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(&Header::default(), &payload, &self.encoding)
            .map_err(|err| DomainError::Internal(format!("token signing failed: {err}")))
    }

    fn decode(&self, token: &str) -> Result<SessionClaims> {
        let data = decode::<JwtClaims>(token, &self.decoding, &Validation::default())
            .map_err(|err| DomainError::Auth(format!("invalid or expired token: {err}")))?;
        Ok(SessionClaims {
            account_id: data.claims.sub,
            email: data.claims.email,
            kind: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("secret123").unwrap();
        assert!(hasher.verify("secret123", &hash));
        assert!(!hasher.verify("wrong-password", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hashes() {
        assert!(!Argon2Hasher.verify("secret123", "not-a-phc-string"));
    }

    #[test]
    fn issue_then_decode_roundtrip() {
        let issuer = JwtIssuer::new("test-secret");
        let claims = SessionClaims {
            account_id: Uuid::now_v7(),
            email: "a@x.com".into(),
            kind: AccountKind::Guide,
        };
        let token = issuer.issue(&claims).unwrap();
        assert_eq!(issuer.decode(&token).unwrap(), claims);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let claims = SessionClaims {
            account_id: Uuid::now_v7(),
            email: "a@x.com".into(),
            kind: AccountKind::Traveler,
        };
        let token = JwtIssuer::new("secret-a").issue(&claims).unwrap();
        let err = JwtIssuer::new("secret-b").decode(&token).unwrap_err();
        assert!(matches!(err, DomainError::Auth(_)));
    }
}
