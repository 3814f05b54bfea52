//! Bearer-token principal extractor.

use axum::extract::{FromRef, FromRequestParts};
use http::HeaderMap;
use http::header::AUTHORIZATION;
use http::request::Parts;

use cisne_core::error::AppError;
use cisne_domain::id::EntityId;
use cisne_domain::role::Role;

use crate::token::{AuthError, Claims, TokenSettings, validate_token};

/// The authenticated caller, decoded from `Authorization: Bearer <token>`.
///
/// Rejects with 401 when the header is absent, the scheme is not `Bearer`,
/// or the token fails validation. Role and ownership checks happen later,
/// against the target entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: EntityId,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Return the token of a `Bearer` authorization header. The scheme name is
/// matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn authenticate(headers: &HeaderMap, settings: &TokenSettings) -> Result<Principal, AppError> {
    let token = bearer_token(headers).ok_or(AppError::MissingToken)?;
    validate_token(token, settings.secret())
        .map(Principal::from)
        .map_err(|e| match e {
            AuthError::Expired => AppError::ExpiredToken,
            _ => AppError::InvalidToken,
        })
}

impl<S> FromRequestParts<S> for Principal
where
    TokenSettings: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    // Validation is synchronous, so the returned future owns its result and
    // borrows nothing from `parts` or `state`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let settings = TokenSettings::from_ref(state);
        let result = authenticate(&parts.headers, &settings);
        async move { result }
    }
}
