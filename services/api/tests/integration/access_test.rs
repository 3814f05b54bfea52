use axum::http::StatusCode;
use serde_json::{Value, json};

use cisne_testing::auth::MockAuth;

use crate::helpers::{admin, spawn_app};

#[tokio::test]
async fn should_forbid_wrong_role() {
    let app = spawn_app().await;
    let therapist = app.therapist("t@x.com", "10000000A").await;
    let (name, value) = therapist.header();

    let resp = app
        .server
        .post("/api/centres/me/therapists")
        .add_header(name, value)
        .json(&json!({"therapist_id": therapist.id}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::FORBIDDEN);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "FORBIDDEN_ROLE");
}

#[tokio::test]
async fn should_forbid_acting_for_another_owner() {
    let app = spawn_app().await;
    let centre_a = app.centre("a@x.com", "B00000001").await;
    let centre_b = app.centre("b@x.com", "B00000002").await;
    let therapist = app.therapist("t@x.com", "10000000A").await;
    let (name, value) = centre_a.header();

    let resp = app
        .server
        .post(&format!("/api/centres/{}/therapists", centre_b.id))
        .add_header(name, value)
        .json(&json!({"therapist_id": therapist.id}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::FORBIDDEN);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "FORBIDDEN_NOT_OWNER");
}

#[tokio::test]
async fn should_let_admin_act_for_any_owner() {
    let app = spawn_app().await;
    let centre = app.centre("a@x.com", "B00000001").await;
    let therapist = app.therapist("t@x.com", "10000000A").await;
    let (name, value) = admin();

    let resp = app
        .server
        .post(&format!("/api/centres/{}/therapists", centre.id))
        .add_header(name, value)
        .json(&json!({"therapist_id": therapist.id}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn should_compare_string_and_numeric_ids_by_value() {
    let app = spawn_app().await;
    let centre = app.centre("a@x.com", "B00000001").await;
    let therapist = app.therapist("t@x.com", "10000000A").await;
    let (name, value) = centre.header();

    let resp = app
        .server
        .post(&format!("/api/centres/{}/therapists", centre.id))
        .add_header(name, value)
        .json(&json!({"therapist_id": therapist.id.to_string()}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CREATED);
    let json: Value = resp.json();
    assert_eq!(json["data"]["left_id"], centre.id);
    assert_eq!(json["data"]["right_id"], therapist.id);
}

#[tokio::test]
async fn should_report_missing_endpoint_as_not_found() {
    let app = spawn_app().await;
    let centre = app.centre("a@x.com", "B00000001").await;
    let (name, value) = centre.header();

    let resp = app
        .server
        .post("/api/centres/me/therapists")
        .add_header(name, value)
        .json(&json!({"therapist_id": 424242}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "THERAPIST_NOT_FOUND");
}

#[tokio::test]
async fn should_not_find_missing_profile_by_id() {
    let app = spawn_app().await;
    let resp = app.server.get("/api/therapists/424242").await;
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "THERAPIST_NOT_FOUND");

    let resp = app.server.get("/api/therapists/abc").await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_require_auth_for_patient_reads() {
    let app = spawn_app().await;
    let patient = app.patient("p@x.com", "20000000B").await;

    let resp = app.server.get("/api/patients").await;
    assert_eq!(resp.status_code(), StatusCode::UNAUTHORIZED);

    let (name, value) = MockAuth::therapist(77).header();
    let resp = app
        .server
        .get(&format!("/api/patients/{}", patient.id))
        .add_header(name, value)
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(json["data"]["nif"], "20000000B");
}

#[tokio::test]
async fn should_only_let_patient_edit_own_profile() {
    let app = spawn_app().await;
    let pablo = app.patient("p@x.com", "20000000B").await;
    let marta = app.patient("m@x.com", "30000000C").await;

    let (name, value) = marta.header();
    let resp = app
        .server
        .put(&format!("/api/patients/{}", pablo.id))
        .add_header(name, value)
        .json(&json!({"diagnosis": "none"}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::FORBIDDEN);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "FORBIDDEN_NOT_OWNER");

    let (name, value) = pablo.header();
    let resp = app
        .server
        .put("/api/patients/me")
        .add_header(name, value)
        .json(&json!({"diagnosis": "ADHD"}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(json["data"]["diagnosis"], "ADHD");
}

#[tokio::test]
async fn should_reject_empty_profile_update() {
    let app = spawn_app().await;
    let pablo = app.patient("p@x.com", "20000000B").await;
    let (name, value) = pablo.header();

    let resp = app
        .server
        .put("/api/patients/me")
        .add_header(name, value)
        .json(&json!({}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "EMPTY_UPDATE");
}

#[tokio::test]
async fn should_restrict_user_administration_to_admin() {
    let app = spawn_app().await;
    let centre = app.centre("a@x.com", "B00000001").await;

    let (name, value) = centre.header();
    let resp = app.server.get("/api/users").add_header(name, value).await;
    assert_eq!(resp.status_code(), StatusCode::FORBIDDEN);

    let (name, value) = admin();
    let resp = app
        .server
        .get("/api/users")
        .add_query_param("email", "a@x")
        .add_header(name, value)
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(json["count"], 1);

    let (name, value) = admin();
    let resp = app
        .server
        .get(&format!("/api/users/{}/profile-kind", centre.id))
        .add_header(name, value)
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);
}
