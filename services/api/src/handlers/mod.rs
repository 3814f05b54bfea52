pub mod auth;
pub mod centre;
pub mod course;
pub mod health;
pub mod invoice;
pub mod link;
pub mod patient;
pub mod resource;
pub mod service;
pub mod therapist;
pub mod user;

use chrono::NaiveDate;
use serde::Deserialize;

use cisne_domain::id::EntityId;

/// Current calendar day, used for relationship dates and availability filters.
pub(crate) fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// `/{id}` path segment.
#[derive(Debug, Deserialize)]
pub struct IdPath {
    pub id: EntityId,
}
