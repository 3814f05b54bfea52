use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::helpers::{admin, ids, spawn_app};

#[tokio::test]
async fn should_restrict_service_writes_to_admin() {
    let app = spawn_app().await;
    let centre = app.centre("c@x.com", "B10000000").await;

    let (name, value) = centre.header();
    let resp = app
        .server
        .post("/api/services")
        .add_header(name, value)
        .json(&json!({"name": "Physio session"}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::FORBIDDEN);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "FORBIDDEN_ROLE");

    let id = app
        .create(
            "/api/services",
            admin(),
            json!({"name": "Physio session", "price": 35.5, "room": "2B"}),
        )
        .await;
    let resp = app.server.get(&format!("/api/services/{id}")).await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(json["data"]["room"], "2B");
    assert_eq!(json["data"]["price"], 35.5);
}

#[tokio::test]
async fn should_reject_negative_price_and_missing_invoice() {
    let app = spawn_app().await;
    let (name, value) = admin();
    let resp = app
        .server
        .post("/api/services")
        .add_header(name, value)
        .json(&json!({"name": "Bad", "price": -1.0}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);

    let (name, value) = admin();
    let resp = app
        .server
        .post("/api/services")
        .add_header(name, value)
        .json(&json!({"name": "Orphan", "invoice_id": 424242}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "INVOICE_NOT_FOUND");
}

#[tokio::test]
async fn should_filter_services_by_price_range() {
    let app = spawn_app().await;
    let cheap = app
        .create("/api/services", admin(), json!({"name": "Check-up", "price": 20.0}))
        .await;
    let pricey = app
        .create("/api/services", admin(), json!({"name": "Assessment", "price": 90.0}))
        .await;

    let resp = app
        .server
        .get("/api/services")
        .add_query_param("min_price", 50)
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(ids(&json), vec![pricey]);

    let resp = app
        .server
        .get("/api/services")
        .add_query_param("max_price", 50)
        .await;
    let json: Value = resp.json();
    assert_eq!(ids(&json), vec![cheap]);

    let resp = app
        .server
        .get("/api/services")
        .add_query_param("min_price", 100)
        .add_query_param("max_price", 10)
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "INVALID_RANGE");
}

#[tokio::test]
async fn should_hide_past_services_from_available_listing() {
    let app = spawn_app().await;
    let past = app
        .create(
            "/api/services",
            admin(),
            json!({"name": "Old session", "service_date": "2001-01-01"}),
        )
        .await;
    let future = app
        .create(
            "/api/services",
            admin(),
            json!({"name": "New session", "service_date": "2999-01-01"}),
        )
        .await;
    let undated = app
        .create("/api/services", admin(), json!({"name": "Anytime"}))
        .await;

    let json: Value = app.server.get("/api/services/available").await.json();
    let listed = ids(&json);
    assert!(!listed.contains(&past));
    assert!(listed.contains(&future));
    assert!(listed.contains(&undated));
}

#[tokio::test]
async fn should_manage_invoices_as_admin_only() {
    let app = spawn_app().await;
    let patient = app.patient("p@x.com", "20000000B").await;

    let (name, value) = patient.header();
    let resp = app.server.get("/api/invoices").add_header(name, value).await;
    assert_eq!(resp.status_code(), StatusCode::FORBIDDEN);

    let (name, value) = admin();
    let resp = app
        .server
        .post("/api/invoices/services")
        .add_header(name, value)
        .json(&json!({"number": "F-2026-001", "invoice_date": "2026-02-01", "tax_amount": 21.0}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CREATED);
    let json: Value = resp.json();
    assert_eq!(json["data"]["kind"], "service");
    assert_eq!(json["data"]["payment_status"], "pending");
    let invoice = json["data"]["id"].as_i64().unwrap();

    let (name, value) = admin();
    let resp = app
        .server
        .post("/api/invoices/courses")
        .add_header(name, value)
        .json(&json!({"number": "F-2026-001", "invoice_date": "2026-02-02"}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CONFLICT);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "INVOICE_NUMBER_TAKEN");

    let (name, value) = admin();
    let resp = app
        .server
        .post("/api/invoices")
        .add_header(name, value)
        .json(&json!({"number": "F-2026-002"}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "MISSING_FIELD");

    let (name, value) = admin();
    let pending: Value = app
        .server
        .get("/api/invoices/pending")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(ids(&pending), vec![invoice]);

    let (name, value) = admin();
    let resp = app
        .server
        .patch(&format!("/api/invoices/{invoice}/payment-status"))
        .add_header(name, value)
        .json(&json!({"payment_status": "paid"}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(json["data"]["payment_status"], "paid");

    let (name, value) = admin();
    let pending: Value = app
        .server
        .get("/api/invoices/pending")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(pending["count"], 0);

    let (name, value) = admin();
    let resp = app
        .server
        .delete(&format!("/api/invoices/{invoice}"))
        .add_header(name, value)
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);

    let (name, value) = admin();
    let resp = app
        .server
        .get(&format!("/api/invoices/{invoice}"))
        .add_header(name, value)
        .await;
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_filter_invoices_by_kind_and_date() {
    let app = spawn_app().await;
    let service_invoice = app
        .create(
            "/api/invoices/services",
            admin(),
            json!({"number": "S-1", "invoice_date": "2026-01-10"}),
        )
        .await;
    let course_invoice = app
        .create(
            "/api/invoices/courses",
            admin(),
            json!({"number": "C-1", "invoice_date": "2026-05-10"}),
        )
        .await;

    let (name, value) = admin();
    let json: Value = app
        .server
        .get("/api/invoices")
        .add_query_param("kind", "course")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(ids(&json), vec![course_invoice]);

    let (name, value) = admin();
    let json: Value = app
        .server
        .get("/api/invoices")
        .add_query_param("to", "2026-02-01")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(ids(&json), vec![service_invoice]);

    let (name, value) = admin();
    let resp = app
        .server
        .get("/api/invoices")
        .add_query_param("from", "2026-06-01")
        .add_query_param("to", "2026-01-01")
        .add_header(name, value)
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_filter_courses_and_let_admin_post_for_centre() {
    let app = spawn_app().await;
    let centre = app.centre("c@x.com", "B10000000").await;

    let (name, value) = admin();
    let resp = app
        .server
        .post("/api/courses")
        .add_header(name, value)
        .json(&json!({"name": "Dyslexia workshop", "teacher": "Dr. Vega", "centre_id": centre.id}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CREATED);
    let json: Value = resp.json();
    let course = json["data"]["id"].as_i64().unwrap();

    let centres: Value = app
        .server
        .get(&format!("/api/courses/{course}/centres"))
        .await
        .json();
    assert_eq!(ids(&centres), vec![centre.id]);

    let json: Value = app
        .server
        .get("/api/courses")
        .add_query_param("name", "dyslexia")
        .await
        .json();
    assert_eq!(ids(&json), vec![course]);

    let json: Value = app
        .server
        .get("/api/courses")
        .add_query_param("name", "nothing like it")
        .await
        .json();
    assert_eq!(json["count"], 0);

    let (name, value) = centre.header();
    let resp = app
        .server
        .put(&format!("/api/courses/{course}"))
        .add_header(name, value)
        .json(&json!({"price": 15.0}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(json["data"]["price"], 15.0);
}
