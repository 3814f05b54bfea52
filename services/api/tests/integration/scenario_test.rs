use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::helpers::{admin, ids, spawn_app};

#[tokio::test]
async fn should_feed_patient_resources_from_treating_therapist() {
    let app = spawn_app().await;
    let author = app.therapist("t7@x.com", "70000000A").await;
    let stranger = app.therapist("t8@x.com", "80000000B").await;
    let patient = app.patient("p9@x.com", "90000000C").await;

    let resource = app
        .create(
            "/api/resources",
            author.header(),
            json!({"name": "Phonics worksheet", "resource_type": "pdf"}),
        )
        .await;

    let (name, value) = author.header();
    let mine: Value = app
        .server
        .get("/api/resources/mine")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(ids(&mine), vec![resource]);

    let (name, value) = author.header();
    app.server
        .post("/api/therapists/me/patients")
        .add_header(name, value)
        .json(&json!({"patient_id": patient.id}))
        .await
        .assert_status(StatusCode::CREATED);

    let (name, value) = patient.header();
    let feed: Value = app
        .server
        .get("/api/resources/feed")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(ids(&feed), vec![resource]);

    let (name, value) = stranger.header();
    let resp = app
        .server
        .put(&format!("/api/resources/{resource}"))
        .add_header(name, value)
        .json(&json!({"name": "Hijacked"}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::FORBIDDEN);
    let json: Value = resp.json();
    assert_eq!(json["kind"], "FORBIDDEN_NOT_OWNER");

    let (name, value) = author.header();
    let resp = app
        .server
        .put(&format!("/api/resources/{resource}"))
        .add_header(name, value)
        .json(&json!({"name": "Phonics worksheet v2"}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn should_offer_posted_courses_to_employed_therapists_until_bought() {
    let app = spawn_app().await;
    let centre = app.centre("c4@x.com", "B40000000").await;
    let therapist = app.therapist("t7@x.com", "70000000A").await;

    let course = app
        .create(
            "/api/courses",
            centre.header(),
            json!({"name": "Early intervention", "price": 120.0}),
        )
        .await;
    let centres: Value = app
        .server
        .get(&format!("/api/courses/{course}/centres"))
        .await
        .json();
    assert_eq!(ids(&centres), vec![centre.id]);

    let (name, value) = centre.header();
    app.server
        .post("/api/centres/me/therapists")
        .add_header(name, value)
        .json(&json!({"therapist_id": therapist.id}))
        .await
        .assert_status(StatusCode::CREATED);

    let (name, value) = therapist.header();
    let available: Value = app
        .server
        .get("/api/therapists/me/courses/available")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(ids(&available), vec![course]);

    let (name, value) = therapist.header();
    let resp = app
        .server
        .post("/api/therapists/me/courses")
        .add_header(name, value)
        .json(&json!({"course_id": course, "buying_date": "2026-03-01"}))
        .await;
    assert_eq!(resp.status_code(), StatusCode::CREATED);
    let json: Value = resp.json();
    assert_eq!(json["data"]["date"], "2026-03-01");

    let (name, value) = therapist.header();
    let available: Value = app
        .server
        .get("/api/therapists/me/courses/available")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(available["count"], 0);

    let (name, value) = therapist.header();
    let bought: Value = app
        .server
        .get("/api/therapists/me/courses")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(ids(&bought), vec![course]);
}

#[tokio::test]
async fn should_refuse_course_not_offered_by_employer() {
    let app = spawn_app().await;
    let employer = app.centre("c1@x.com", "B10000000").await;
    let other = app.centre("c2@x.com", "B20000000").await;
    let therapist = app.therapist("t@x.com", "70000000A").await;

    let (name, value) = employer.header();
    app.server
        .post("/api/centres/me/therapists")
        .add_header(name, value)
        .json(&json!({"therapist_id": therapist.id}))
        .await
        .assert_status(StatusCode::CREATED);
    let course = app
        .create("/api/courses", other.header(), json!({"name": "Elsewhere"}))
        .await;

    for auth in [therapist.header(), admin()] {
        let resp = app
            .server
            .post(&format!("/api/therapists/{}/courses", therapist.id))
            .add_header(auth.0, auth.1)
            .json(&json!({"course_id": course}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::FORBIDDEN);
        let json: Value = resp.json();
        assert_eq!(json["kind"], "COURSE_NOT_OFFERED");
    }
}

#[tokio::test]
async fn should_remove_postings_when_centre_deletes_course() {
    let app = spawn_app().await;
    let centre = app.centre("c@x.com", "B10000000").await;
    let rival = app.centre("r@x.com", "B20000000").await;
    let course = app
        .create("/api/courses", centre.header(), json!({"name": "Autism basics"}))
        .await;

    let (name, value) = rival.header();
    let resp = app
        .server
        .delete(&format!("/api/courses/{course}"))
        .add_header(name, value)
        .await;
    assert_eq!(resp.status_code(), StatusCode::FORBIDDEN);

    let (name, value) = centre.header();
    let resp = app
        .server
        .delete(&format!("/api/courses/{course}"))
        .add_header(name, value)
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);

    let resp = app.server.get(&format!("/api/courses/{course}")).await;
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);

    let (name, value) = centre.header();
    let posted: Value = app
        .server
        .get("/api/centres/me/courses")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(posted["count"], 0);
}

#[tokio::test]
async fn should_remove_profile_with_me_route() {
    let app = spawn_app().await;
    let therapist = app.therapist("t@x.com", "70000000A").await;

    let (name, value) = therapist.header();
    let resp = app
        .server
        .delete("/api/therapists/me")
        .add_header(name, value)
        .await;
    assert_eq!(resp.status_code(), StatusCode::OK);

    let resp = app
        .server
        .get(&format!("/api/therapists/{}", therapist.id))
        .await;
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);

    let (name, value) = therapist.header();
    let resp = app
        .server
        .delete("/api/therapists/me")
        .add_header(name, value)
        .await;
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
}
