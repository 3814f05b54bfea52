use axum::http::StatusCode;
use serde_json::Value;

use crate::helpers::spawn_app;

#[tokio::test]
async fn should_report_liveness_and_readiness() {
    let app = spawn_app().await;

    let resp = app.server.get("/healthz").await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "ok");

    let resp = app.server.get("/readyz").await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(json["message"], "ready");
}
