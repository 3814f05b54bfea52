use axum::http::StatusCode;
use sea_orm::{ConnectionTrait, Statement};
use serde_json::{Value, json};

use crate::helpers::spawn_app;

#[tokio::test]
async fn should_register_centre_and_reject_duplicate_cif() {
    let app = spawn_app().await;
    let body = json!({
        "email": "a@x.com",
        "password": "secret1",
        "role": "CENTRE",
        "cif": "B12345678",
        "name": "Clinic A",
        "location": "Madrid",
    });

    let resp = app.register(body).await;
    assert_eq!(resp.status_code(), StatusCode::CREATED);
    let json: Value = resp.json();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["user"]["email"], "a@x.com");
    assert_eq!(json["data"]["user"]["role"], "CENTRE");
    assert!(json["data"]["token"].as_str().is_some());

    let resp = app
        .register(json!({
            "email": "b@x.com",
            "password": "secret1",
            "role": "CENTRE",
            "cif": "B12345678",
            "name": "Clinic B",
            "location": "Sevilla",
        }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CONFLICT);
    let json: Value = resp.json();
    assert_eq!(json["success"], false);
    assert_eq!(json["kind"], "CIF_TAKEN");
}

#[tokio::test]
async fn should_reject_duplicate_email_ignoring_case() {
    let app = spawn_app().await;
    app.patient("ana@x.com", "11111111A").await;

    let resp = app
        .register(json!({
            "email": "ANA@X.com",
            "password": "secret1",
            "role": "PATIENT",
            "name": "Ana Gil",
            "nif": "22222222B",
        }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CONFLICT);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "EMAIL_TAKEN");
}

#[tokio::test]
async fn should_reject_nif_held_by_other_profile_kind() {
    let app = spawn_app().await;
    app.therapist("t@x.com", "12345678Z").await;

    let resp = app
        .register(json!({
            "email": "p@x.com",
            "password": "secret1",
            "role": "PATIENT",
            "name": "Pablo Ruiz",
            "nif": "12345678z",
        }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CONFLICT);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "NIF_TAKEN_BY_THERAPIST");

    app.patient("p2@x.com", "87654321X").await;
    let resp = app
        .register(json!({
            "email": "t2@x.com",
            "password": "secret1",
            "role": "THERAPIST",
            "name": "Laura Martín",
            "nif": "87654321X",
        }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CONFLICT);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "NIF_TAKEN_BY_PATIENT");
}

#[tokio::test]
async fn should_reject_admin_and_unknown_roles() {
    let app = spawn_app().await;
    for role in ["ADMIN", "JANITOR"] {
        let resp = app
            .register(json!({
                "email": format!("{role}@x.com"),
                "password": "secret1",
                "role": role,
                "name": "Some One",
                "nif": "33333333C",
            }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST, "role {role}");
        let json: Value = resp.json();
        assert_eq!(json["kind"], "UNSUPPORTED_ROLE");
    }
}

#[tokio::test]
async fn should_default_absent_role_to_patient() {
    let app = spawn_app().await;
    let resp = app
        .register(json!({
            "email": "norole@x.com",
            "password": "secret1",
            "name": "Marta Sanz",
            "nif": "44444444D",
        }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CREATED);
    let json: Value = resp.json();
    assert_eq!(json["data"]["user"]["role"], "PATIENT");
}

#[tokio::test]
async fn should_validate_email_and_password() {
    let app = spawn_app().await;

    let resp = app
        .register(json!({
            "email": "not-an-email",
            "password": "secret1",
            "name": "A B",
            "nif": "1",
        }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "INVALID_EMAIL");

    let resp = app
        .register(json!({"email": "ok@x.com", "password": "123", "name": "A B", "nif": "1"}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "PASSWORD_TOO_SHORT");
}

#[tokio::test]
async fn should_require_profile_fields_for_role() {
    let app = spawn_app().await;
    let resp = app
        .register(json!({
            "email": "c@x.com",
            "password": "secret1",
            "role": "CENTRE",
            "name": "Clinic",
            "location": "Madrid",
        }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "MISSING_FIELD");
}

#[tokio::test]
async fn should_roll_back_user_when_profile_insert_fails() {
    let app = spawn_app().await;
    let backend = app.db.get_database_backend();
    app.db
        .execute(Statement::from_string(
            backend,
            "CREATE TRIGGER fail_patient BEFORE INSERT ON patients \
             BEGIN SELECT RAISE(ABORT, 'boom'); END",
        ))
        .await
        .unwrap();

    let resp = app
        .register(json!({
            "email": "rollback@x.com",
            "password": "secret1",
            "role": "PATIENT",
            "name": "Pablo Ruiz",
            "nif": "55555555E",
        }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = resp.json();
    assert_eq!(json["message"], "internal error");

    let row = app
        .db
        .query_one(Statement::from_string(
            backend,
            "SELECT COUNT(*) AS n FROM users",
        ))
        .await
        .unwrap()
        .unwrap();
    let users: i64 = row.try_get("", "n").unwrap();
    assert_eq!(users, 0);
}

#[tokio::test]
async fn should_login_and_hide_which_credential_was_wrong() {
    let app = spawn_app().await;
    app.therapist("laura@x.com", "66666666F").await;

    let resp = app
        .server
        .post("/api/auth/login")
        .json(&json!({"email": "Laura@x.com", "password": "secret123"}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(json["data"]["user"]["role"], "THERAPIST");

    let wrong_password = app
        .server
        .post("/api/auth/login")
        .json(&json!({"email": "laura@x.com", "password": "nope-nope"}))
        .await;
    let unknown_email = app
        .server
        .post("/api/auth/login")
        .json(&json!({"email": "ghost@x.com", "password": "secret123"}))
        .await;
    assert_eq!(wrong_password.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.json::<Value>()["message"],
        unknown_email.json::<Value>()["message"]
    );
}

#[tokio::test]
async fn should_return_own_account_with_profile() {
    let app = spawn_app().await;
    let centre = app.centre("centre@x.com", "B00000001").await;
    let (name, value) = centre.header();

    let resp = app.server.get("/api/auth/me").add_header(name, value).await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    let json: Value = resp.json();
    assert_eq!(json["data"]["user"]["id"], centre.id);
    assert_eq!(json["data"]["profile"]["cif"], "B00000001");
}

#[tokio::test]
async fn should_reject_requests_without_token() {
    let app = spawn_app().await;
    let resp = app.server.get("/api/auth/me").await;
    assert_eq!(resp.status_code(), StatusCode::UNAUTHORIZED);

    let resp = app
        .server
        .post("/api/centres/me/therapists")
        .json(&json!({"therapist_id": 1}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::UNAUTHORIZED);
}
