use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::helpers::{admin, ids, spawn_app};

#[tokio::test]
async fn should_reject_duplicate_and_allow_recreate_after_delete() {
    let app = spawn_app().await;
    let centre = app.centre("a@x.com", "B00000001").await;
    let therapist = app.therapist("t@x.com", "10000000A").await;
    let body = json!({"therapist_id": therapist.id, "contract": "full-time"});

    let (name, value) = centre.header();
    let resp = app
        .server
        .post("/api/centres/me/therapists")
        .add_header(name, value)
        .json(&body)
        .await;
    assert_eq!(resp.status_code(), StatusCode::CREATED);

    let (name, value) = centre.header();
    let resp = app
        .server
        .post("/api/centres/me/therapists")
        .add_header(name, value)
        .json(&body)
        .await;
    assert_eq!(resp.status_code(), StatusCode::CONFLICT);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "RELATIONSHIP_EXISTS");

    let (name, value) = centre.header();
    let resp = app
        .server
        .delete(&format!("/api/centres/me/therapists/{}", therapist.id))
        .add_header(name, value)
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(json["message"], "employs relationship deleted");

    let (name, value) = centre.header();
    let resp = app
        .server
        .post("/api/centres/me/therapists")
        .add_header(name, value)
        .json(&body)
        .await;
    assert_eq!(resp.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn should_report_missing_relationship_on_delete() {
    let app = spawn_app().await;
    let therapist = app.therapist("t@x.com", "10000000A").await;
    let patient = app.patient("p@x.com", "20000000B").await;

    let (name, value) = therapist.header();
    let resp = app
        .server
        .delete(&format!("/api/therapists/me/patients/{}", patient.id))
        .add_header(name, value)
        .await;
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "RELATIONSHIP_NOT_FOUND");
}

#[tokio::test]
async fn should_fill_payload_defaults() {
    let app = spawn_app().await;
    let centre = app.centre("a@x.com", "B00000001").await;
    let therapist = app.therapist("t@x.com", "10000000A").await;
    let patient = app.patient("p@x.com", "20000000B").await;

    let (name, value) = centre.header();
    let resp = app
        .server
        .post("/api/centres/me/therapists")
        .add_header(name, value)
        .json(&json!({"therapist_id": therapist.id}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CREATED);
    let json: Value = resp.json();
    assert_eq!(json["data"]["contract"], "not specified");

    let (name, value) = therapist.header();
    let resp = app
        .server
        .post("/api/therapists/me/patients")
        .add_header(name, value)
        .json(&json!({"patient_id": patient.id, "report": "  "}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CREATED);
    let json: Value = resp.json();
    assert_eq!(json["data"]["report"], "treatment started");

    let course = app
        .create("/api/courses", centre.header(), json!({"name": "Sign language"}))
        .await;
    let (name, value) = centre.header();
    let resp = app
        .server
        .get("/api/centres/me/courses")
        .add_header(name, value)
        .await;
    let json: Value = resp.json();
    assert_eq!(ids(&json), vec![course]);
    assert!(json["data"][0]["relationship"]["date"].as_str().is_some());
}

#[tokio::test]
async fn should_update_relationship_attribute() {
    let app = spawn_app().await;
    let therapist = app.therapist("t@x.com", "10000000A").await;
    let patient = app.patient("p@x.com", "20000000B").await;

    let (name, value) = therapist.header();
    app.server
        .post("/api/therapists/me/patients")
        .add_header(name, value)
        .json(&json!({"patient_id": patient.id}))
        .await
        .assert_status(StatusCode::CREATED);

    let (name, value) = therapist.header();
    let resp = app
        .server
        .put(&format!("/api/therapists/me/patients/{}", patient.id))
        .add_header(name, value)
        .json(&json!({"report": "progressing well"}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(json["data"]["report"], "progressing well");

    let (name, value) = therapist.header();
    let resp = app
        .server
        .put(&format!("/api/therapists/me/patients/{}", patient.id))
        .add_header(name, value)
        .json(&json!({}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);

    let (name, value) = patient.header();
    let resp = app
        .server
        .get("/api/patients/me/therapists")
        .add_header(name, value)
        .await;
    let json: Value = resp.json();
    assert_eq!(ids(&json), vec![therapist.id]);
    assert_eq!(json["data"][0]["relationship"]["report"], "progressing well");
}

#[tokio::test]
async fn should_share_logic_between_me_and_id_routes() {
    let app = spawn_app().await;
    let patient = app.patient("p@x.com", "20000000B").await;
    let service = app
        .create("/api/services", admin(), json!({"name": "Speech session", "price": 40.0}))
        .await;

    let (name, value) = patient.header();
    app.server
        .post(&format!("/api/patients/{}/services", patient.id))
        .add_header(name, value)
        .json(&json!({"service_id": service}))
        .await
        .assert_status(StatusCode::CREATED);

    let (name, value) = patient.header();
    let resp = app
        .server
        .post("/api/patients/me/services")
        .add_header(name, value)
        .json(&json!({"service_id": service}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CONFLICT);

    let (name, value) = patient.header();
    let mine: Value = app
        .server
        .get("/api/patients/me/services")
        .add_header(name, value)
        .await
        .json();
    let (name, value) = patient.header();
    let by_id: Value = app
        .server
        .get(&format!("/api/patients/{}/services", patient.id))
        .add_header(name, value)
        .await
        .json();
    assert_eq!(ids(&mine), vec![service]);
    assert_eq!(mine, by_id);

    let (name, value) = admin();
    let payers: Value = app
        .server
        .get(&format!("/api/services/{service}/patients"))
        .add_header(name, value)
        .await
        .json();
    assert_eq!(ids(&payers), vec![patient.id]);
}

#[tokio::test]
async fn should_list_empty_for_existing_anchor_and_404_for_missing() {
    let app = spawn_app().await;
    let centre = app.centre("a@x.com", "B00000001").await;

    let resp = app
        .server
        .get(&format!("/api/centres/{}/therapists", centre.id))
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(json["count"], 0);

    let resp = app.server.get("/api/centres/424242/therapists").await;
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "CENTRE_NOT_FOUND");
}

#[tokio::test]
async fn should_keep_publication_when_resource_consumed() {
    let app = spawn_app().await;
    let therapist = app.therapist("t@x.com", "10000000A").await;
    let patient = app.patient("p@x.com", "20000000B").await;
    let resource = app
        .create(
            "/api/resources",
            therapist.header(),
            json!({"name": "Breathing exercises", "resource_type": "video"}),
        )
        .await;

    let (name, value) = patient.header();
    app.server
        .post("/api/patients/me/resources")
        .add_header(name, value)
        .json(&json!({"resource_id": resource}))
        .await
        .assert_status(StatusCode::CREATED);

    let publishers: Value = app
        .server
        .get(&format!("/api/resources/{resource}/publishers"))
        .await
        .json();
    assert_eq!(ids(&publishers), vec![therapist.id]);

    let (name, value) = therapist.header();
    let consumers: Value = app
        .server
        .get(&format!("/api/resources/{resource}/consumers"))
        .add_header(name, value)
        .await
        .json();
    assert_eq!(ids(&consumers), vec![patient.id]);

    let popular: Value = app.server.get("/api/resources/popular").await.json();
    assert_eq!(popular["data"][0]["id"], resource);
    assert_eq!(popular["data"][0]["consumers"], 1);
}
