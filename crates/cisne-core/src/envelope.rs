//! The `{success, data?, count?, message?}` body every endpoint returns.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body shared by success and failure responses.
///
/// Failures additionally carry a machine-readable `kind` code.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A successful response: status code plus envelope.
#[derive(Debug)]
pub struct Reply<T> {
    status: StatusCode,
    envelope: Envelope<T>,
}

impl<T: Serialize> Reply<T> {
    fn new(status: StatusCode, data: Option<T>) -> Self {
        Self {
            status,
            envelope: Envelope {
                success: true,
                data,
                count: None,
                kind: None,
                message: None,
            },
        }
    }

    /// `200 OK` with `data`.
    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, Some(data))
    }

    /// `201 Created` with `data`.
    pub fn created(data: T) -> Self {
        Self::new(StatusCode::CREATED, Some(data))
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.envelope.message = Some(message.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> Reply<Vec<T>> {
    /// `200 OK` with `data` and `count` set to the number of items.
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        let mut reply = Self::new(StatusCode::OK, Some(items));
        reply.envelope.count = Some(count);
        reply
    }
}

impl Reply<()> {
    /// `200 OK` with only a message, used by deletes.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, None).with_message(message)
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.status, axum::Json(self.envelope)).into_response()
    }
}

/// Render a failure envelope. Used by every error type's `IntoResponse`.
pub fn failure(status: StatusCode, kind: &'static str, message: String) -> Response {
    let envelope: Envelope<()> = Envelope {
        success: false,
        data: None,
        count: None,
        kind: Some(kind),
        message: Some(message),
    };
    (status, axum::Json(envelope)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn list_sets_count() {
        let resp = Reply::list(vec![1, 2, 3]).into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 3);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert!(json.get("message").is_none());
    }

    #[tokio::test]
    async fn created_returns_201() {
        let resp = Reply::created("x").with_message("done").into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert_eq!(json["data"], "x");
        assert_eq!(json["message"], "done");
        assert!(json.get("count").is_none());
    }

    #[tokio::test]
    async fn message_only_omits_data() {
        let json = body_json(Reply::message("deleted").into_response()).await;
        assert_eq!(json["success"], true);
        assert!(json.get("data").is_none());
        assert_eq!(json["message"], "deleted");
    }

    #[tokio::test]
    async fn failure_marks_unsuccessful() {
        let resp = failure(StatusCode::CONFLICT, "CONFLICT", "taken".into());
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["kind"], "CONFLICT");
        assert_eq!(json["message"], "taken");
    }
}
