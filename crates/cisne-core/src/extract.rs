//! Extractors whose rejections render as [`AppError`] envelopes instead of
//! axum's plain-text defaults.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::InvalidBody(rejection.body_text())),
        }
    }
}

/// Query string parsed with `serde_qs`. An absent query string deserializes
/// from the empty string, so filter structs with all-optional fields succeed.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryString<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryString<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let raw = parts.uri.query().unwrap_or_default();
        let parsed = serde_qs::from_str::<T>(raw)
            .map(Self)
            .map_err(|e| AppError::InvalidQuery(e.to_string()));
        async move { parsed }
    }
}

/// Path parameters.
#[derive(Debug, Clone, Copy)]
pub struct PathParams<T>(pub T);

impl<T, S> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::InvalidPath(rejection.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Filter {
        name: Option<String>,
        min_price: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        email: String,
    }

    async fn query(uri: &str) -> Result<Filter, AppError> {
        let request = HttpRequest::builder().uri(uri).body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        QueryString::<Filter>::from_request_parts(&mut parts, &())
            .await
            .map(|QueryString(f)| f)
    }

    #[tokio::test]
    async fn should_parse_empty_query_as_defaults() {
        let filter = query("/centres").await.unwrap();
        assert_eq!(
            filter,
            Filter {
                name: None,
                min_price: None
            }
        );
    }

    #[tokio::test]
    async fn should_parse_typed_query_values() {
        let filter = query("/courses?name=rehab&min_price=10.5").await.unwrap();
        assert_eq!(filter.name.as_deref(), Some("rehab"));
        assert_eq!(filter.min_price, Some(10.5));
    }

    #[tokio::test]
    async fn should_reject_unparseable_query_value() {
        let err = query("/courses?min_price=cheap").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn should_reject_body_missing_required_field() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"password":"secret"}"#))
            .unwrap();
        let err = JsonBody::<Payload>::from_request(request, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidBody(_)));
    }
}
