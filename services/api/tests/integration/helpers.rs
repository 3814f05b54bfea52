use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use cisne_api::domain::repository::{BatchLookup, EntityDirectory, LinkRepository};
use cisne_api::domain::types::Course;
use cisne_api::error::ApiError;
use cisne_api::router::build_router;
use cisne_api::state::AppState;
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;
use cisne_domain::link::{Link, LinkKey, LinkKind, LinkPayload};
use cisne_testing::auth::{MockAuth, bearer, test_token_settings};
use cisne_testing::db::migrated_sqlite;

// ── HTTP app over in-memory SQLite ───────────────────────────────────────────

pub struct TestApp {
    pub server: TestServer,
    pub db: DatabaseConnection,
}

/// A self-registered account.
pub struct Account {
    pub id: i64,
    pub token: String,
}

impl Account {
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        bearer(&self.token)
    }
}

/// Admins are never registered; a signed token is enough.
pub fn admin() -> (HeaderName, HeaderValue) {
    MockAuth::admin(9_000).header()
}

pub async fn spawn_app() -> TestApp {
    let db = migrated_sqlite().await;
    let state = AppState {
        db: db.clone(),
        tokens: test_token_settings(),
    };
    let server = TestServer::new(build_router(state, "")).expect("build test server");
    TestApp { server, db }
}

impl TestApp {
    pub async fn register(&self, body: Value) -> TestResponse {
        self.server.post("/api/auth/register").json(&body).await
    }

    async fn register_ok(&self, body: Value) -> Account {
        let resp = self.register(body).await;
        assert_eq!(resp.status_code(), StatusCode::CREATED, "{}", resp.text());
        let json: Value = resp.json();
        Account {
            id: json["data"]["user"]["id"].as_i64().expect("user id"),
            token: json["data"]["token"]
                .as_str()
                .expect("session token")
                .to_owned(),
        }
    }

    pub async fn centre(&self, email: &str, cif: &str) -> Account {
        self.register_ok(json!({
            "email": email,
            "password": "secret123",
            "role": "CENTRE",
            "name": "Clinic",
            "cif": cif,
            "location": "Madrid",
        }))
        .await
    }

    pub async fn therapist(&self, email: &str, nif: &str) -> Account {
        self.register_ok(json!({
            "email": email,
            "password": "secret123",
            "role": "THERAPIST",
            "name": "Laura Martín",
            "nif": nif,
            "profession": "speech therapist",
        }))
        .await
    }

    pub async fn patient(&self, email: &str, nif: &str) -> Account {
        self.register_ok(json!({
            "email": email,
            "password": "secret123",
            "role": "PATIENT",
            "name": "Pablo Ruiz",
            "nif": nif,
            "diagnosis": "dyslexia",
        }))
        .await
    }

    /// POST `body` to `path` and return the created row's `data.id`.
    pub async fn create(
        &self,
        path: &str,
        auth: (HeaderName, HeaderValue),
        body: Value,
    ) -> i64 {
        let resp = self
            .server
            .post(path)
            .add_header(auth.0, auth.1)
            .json(&body)
            .await;
        assert_eq!(resp.status_code(), StatusCode::CREATED, "{}", resp.text());
        let json: Value = resp.json();
        json["data"]["id"].as_i64().expect("created id")
    }
}

/// Ids of every item in a list envelope's `data`.
pub fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .expect("list data")
        .iter()
        .map(|item| item["id"].as_i64().expect("item id"))
        .collect()
}

// ── MockLinkRepo ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockLinkRepo {
    pub links: Arc<Mutex<Vec<Link>>>,
}

impl MockLinkRepo {
    pub fn new(links: Vec<Link>) -> Self {
        Self {
            links: Arc::new(Mutex::new(links)),
        }
    }

    /// Returns a shared handle to the stored rows for post-execution inspection.
    pub fn links_handle(&self) -> Arc<Mutex<Vec<Link>>> {
        Arc::clone(&self.links)
    }
}

pub fn link(kind: LinkKind, left: i32, right: i32, payload: LinkPayload) -> Link {
    Link {
        key: LinkKey::new(kind, EntityId::new(left), EntityId::new(right)),
        payload,
    }
}

impl LinkRepository for MockLinkRepo {
    async fn find(&self, key: LinkKey) -> Result<Option<Link>, ApiError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.key == key)
            .cloned())
    }

    async fn insert(&self, link: &Link) -> Result<(), ApiError> {
        let mut links = self.links.lock().unwrap();
        if links.iter().any(|l| l.key == link.key) {
            return Err(ApiError::LinkExists(link.key.kind));
        }
        links.push(link.clone());
        Ok(())
    }

    async fn update_payload(
        &self,
        key: LinkKey,
        payload: &LinkPayload,
    ) -> Result<bool, ApiError> {
        let mut links = self.links.lock().unwrap();
        match links.iter_mut().find(|l| l.key == key) {
            Some(row) => {
                row.payload = payload.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, key: LinkKey) -> Result<bool, ApiError> {
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|l| l.key != key);
        Ok(links.len() < before)
    }

    async fn list_by_left(&self, kind: LinkKind, left: EntityId) -> Result<Vec<Link>, ApiError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.key.kind == kind && l.key.left == left)
            .cloned()
            .collect())
    }

    async fn list_by_right(
        &self,
        kind: LinkKind,
        right: EntityId,
    ) -> Result<Vec<Link>, ApiError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.key.kind == kind && l.key.right == right)
            .cloned()
            .collect())
    }
}

// ── MockDirectory ────────────────────────────────────────────────────────────

pub struct MockDirectory {
    pub entities: HashSet<(EntityKind, EntityId)>,
}

impl MockDirectory {
    pub fn new(entities: &[(EntityKind, i32)]) -> Self {
        Self {
            entities: entities
                .iter()
                .map(|(kind, id)| (*kind, EntityId::new(*id)))
                .collect(),
        }
    }
}

impl EntityDirectory for MockDirectory {
    async fn exists(&self, kind: EntityKind, id: EntityId) -> Result<bool, ApiError> {
        Ok(self.entities.contains(&(kind, id)))
    }

    async fn nif_holder(
        &self,
        _nif: &str,
        _except: Option<EntityId>,
    ) -> Result<Option<EntityKind>, ApiError> {
        Ok(None)
    }

    async fn cif_taken(&self, _cif: &str, _except: Option<EntityId>) -> Result<bool, ApiError> {
        Ok(false)
    }

    async fn profile_kind(&self, _user_id: EntityId) -> Result<Option<EntityKind>, ApiError> {
        Ok(None)
    }
}

// ── MockCourses ──────────────────────────────────────────────────────────────

pub struct MockCourses {
    pub courses: Vec<Course>,
}

pub fn course(id: i32, name: &str) -> Course {
    Course {
        id: EntityId::new(id),
        invoice_id: None,
        name: name.to_owned(),
        teacher: None,
        price: None,
        course_type: None,
        description: None,
        date: None,
    }
}

impl BatchLookup<Course> for MockCourses {
    async fn find_many(&self, ids: &[EntityId]) -> Result<Vec<Course>, ApiError> {
        Ok(self
            .courses
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}
