//! Mock principals for integration tests.
//!
//! Handlers authenticate with `Authorization: Bearer <jwt>`. `MockAuth` signs a
//! real token with the test secret so requests pass the `Principal` extractor
//! without going through registration.

use std::time::Duration;

use http::header::AUTHORIZATION;
use http::{HeaderName, HeaderValue};

use cisne_auth_types::token::{TokenSettings, issue_token};
use cisne_domain::id::EntityId;
use cisne_domain::role::Role;

/// Secret shared by test routers and `MockAuth`.
pub const TEST_JWT_SECRET: &str = "cisne-test-jwt-secret";

/// Token settings matching [`TEST_JWT_SECRET`].
pub fn test_token_settings() -> TokenSettings {
    TokenSettings::new(TEST_JWT_SECRET, Duration::from_secs(3600))
}

/// Configurable identity signed into test requests.
pub struct MockAuth {
    pub id: EntityId,
    pub email: String,
    pub role: Role,
}

impl MockAuth {
    pub fn new(id: i32, role: Role) -> Self {
        Self {
            id: EntityId::new(id),
            email: format!("{}-{id}@cisne.test", role.as_str().to_ascii_lowercase()),
            role,
        }
    }

    pub fn admin(id: i32) -> Self {
        Self::new(id, Role::Admin)
    }

    pub fn centre(id: i32) -> Self {
        Self::new(id, Role::Centre)
    }

    pub fn therapist(id: i32) -> Self {
        Self::new(id, Role::Therapist)
    }

    pub fn patient(id: i32) -> Self {
        Self::new(id, Role::Patient)
    }

    /// A token signed with [`TEST_JWT_SECRET`].
    pub fn token(&self) -> String {
        issue_token(&test_token_settings(), self.id, &self.email, self.role)
            .expect("sign test token")
            .token
    }

    /// `Authorization: Bearer <token>` header pair.
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token()))
            .expect("bearer header value");
        (AUTHORIZATION, value)
    }
}

/// Bearer header pair for an already issued token (e.g. one returned by login).
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    let value = HeaderValue::from_str(&format!("Bearer {token}")).expect("bearer header value");
    (AUTHORIZATION, value)
}
