//! Session-token (JWT) issuing and validation.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use cisne_domain::id::EntityId;
use cisne_domain::role::Role;

/// Default session lifetime: seven days.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Errors returned by [`validate_token`] and [`issue_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// JWT claims payload.
///
/// | Field | Rust type | Meaning |
/// |-------|-----------|---------|
/// | `id` | [`EntityId`] | user id (number; numeric strings are accepted) |
/// | `email` | `String` | normalized login email |
/// | `role` | [`Role`] | upper-case role name |
/// | `exp` | `u64` | expiry, seconds since UNIX epoch |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: EntityId,
    pub email: String,
    pub role: Role,
    pub exp: u64,
}

/// Signing secret and session lifetime, shared through application state.
#[derive(Clone)]
pub struct TokenSettings {
    secret: String,
    ttl: Duration,
}

impl TokenSettings {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sign a token carrying `{id, email, role}` that expires after the configured TTL.
pub fn issue_token(
    settings: &TokenSettings,
    id: EntityId,
    email: &str,
    role: Role,
) -> Result<IssuedToken, AuthError> {
    let expires_at = now_secs() + settings.ttl.as_secs();
    let claims = Claims {
        id,
        email: email.to_owned(),
        role,
        exp: expires_at,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))?;
    Ok(IssuedToken { token, expires_at })
}

/// Decode and validate a token, returning its claims.
///
/// Validation: HS256, `exp` required and checked with the default 60s leeway.
/// Pure function of its inputs; safe to call concurrently.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-unit-tests";

    fn settings() -> TokenSettings {
        TokenSettings::new(TEST_SECRET, Duration::from_secs(3600))
    }

    fn encode_raw(claims: &serde_json::Value) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn should_issue_token_that_validates() {
        let issued = issue_token(&settings(), EntityId::new(7), "t@cisne.test", Role::Therapist)
            .unwrap();
        assert!(!issued.token.is_empty());

        let claims = validate_token(&issued.token, TEST_SECRET).unwrap();
        assert_eq!(claims.id, EntityId::new(7));
        assert_eq!(claims.email, "t@cisne.test");
        assert_eq!(claims.role, Role::Therapist);
        assert_eq!(claims.exp, issued.expires_at);
    }

    #[test]
    fn should_accept_string_id_claim() {
        let token = encode_raw(&serde_json::json!({
            "id": "5",
            "email": "c@cisne.test",
            "role": "CENTRE",
            "exp": now_secs() + 600,
        }));
        let claims = validate_token(&token, TEST_SECRET).unwrap();
        assert_eq!(claims.id, EntityId::new(5));
        assert_eq!(claims.role, Role::Centre);
    }

    #[test]
    fn should_reject_expired_token() {
        let token = encode_raw(&serde_json::json!({
            "id": 5,
            "email": "c@cisne.test",
            "role": "CENTRE",
            "exp": 1_000_000,
        }));
        let err = validate_token(&token, TEST_SECRET).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
    }

    #[test]
    fn should_reject_wrong_secret() {
        let issued =
            issue_token(&settings(), EntityId::new(1), "a@cisne.test", Role::Admin).unwrap();
        let err = validate_token(&issued.token, "wrong-secret").unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[test]
    fn should_reject_malformed_token() {
        let err = validate_token("not-a-jwt", TEST_SECRET).unwrap_err();
        assert!(matches!(err, AuthError::Malformed));
    }

    #[test]
    fn should_redact_secret_in_debug_output() {
        let debug = format!("{:?}", settings());
        assert!(!debug.contains(TEST_SECRET));
    }
}
