#![allow(async_fn_in_trait)]

use chrono::NaiveDate;

use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;
use cisne_domain::link::{Link, LinkKey, LinkKind, LinkPayload};

use crate::domain::types::{
    Centre, CentreFilter, CentrePatch, Course, CourseFilter, CoursePatch, Invoice, InvoiceFilter,
    InvoiceKind, InvoicePatch, NewAccount, NewCentre, NewCourse, NewInvoice, NewPatient,
    NewResource, NewService, NewTherapist, Patient, PatientFilter, PatientPatch, Resource,
    ResourceFilter, ResourcePatch, Service, ServiceFilter, ServicePatch, Therapist,
    TherapistFilter, TherapistPatch, User,
};
use crate::error::ApiError;

/// Repository for login identities.
pub trait AccountRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_id(&self, id: EntityId) -> Result<Option<User>, ApiError>;
    async fn list(&self, email_contains: Option<&str>) -> Result<Vec<User>, ApiError>;

    /// Insert the user and its profile in one transaction.
    ///
    /// Unique-constraint violations are reported as the matching conflict
    /// error (`EmailTaken`, `NifTakenBy*`, `CifTaken`), and nothing is kept.
    async fn register(&self, account: &NewAccount) -> Result<User, ApiError>;

    /// Delete a user; its profile and relationship rows cascade.
    async fn delete(&self, id: EntityId) -> Result<bool, ApiError>;
}

/// Cross-table lookups used by integrity checks.
pub trait EntityDirectory: Send + Sync {
    async fn exists(&self, kind: EntityKind, id: EntityId) -> Result<bool, ApiError>;

    /// Which natural-person table (therapist or patient) already holds `nif`,
    /// ignoring the profile owned by `except`.
    async fn nif_holder(
        &self,
        nif: &str,
        except: Option<EntityId>,
    ) -> Result<Option<EntityKind>, ApiError>;

    async fn cif_taken(&self, cif: &str, except: Option<EntityId>) -> Result<bool, ApiError>;

    /// The profile table that references `user_id`, if any.
    async fn profile_kind(&self, user_id: EntityId) -> Result<Option<EntityKind>, ApiError>;
}

/// Fetch several rows by id. Missing ids are skipped.
pub trait BatchLookup<T>: Send + Sync {
    async fn find_many(&self, ids: &[EntityId]) -> Result<Vec<T>, ApiError>;
}

// ── Profiles ─────────────────────────────────────────────────────────────────

pub trait CentreRepository: Send + Sync {
    async fn list(&self, filter: &CentreFilter) -> Result<Vec<Centre>, ApiError>;
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Centre>, ApiError>;
    async fn create(&self, user_id: EntityId, centre: &NewCentre) -> Result<Centre, ApiError>;
    async fn update(&self, id: EntityId, patch: &CentrePatch) -> Result<Centre, ApiError>;
    async fn delete(&self, id: EntityId) -> Result<bool, ApiError>;
}

pub trait TherapistRepository: Send + Sync {
    async fn list(&self, filter: &TherapistFilter) -> Result<Vec<Therapist>, ApiError>;
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Therapist>, ApiError>;
    async fn create(
        &self,
        user_id: EntityId,
        therapist: &NewTherapist,
    ) -> Result<Therapist, ApiError>;
    async fn update(&self, id: EntityId, patch: &TherapistPatch) -> Result<Therapist, ApiError>;
    async fn delete(&self, id: EntityId) -> Result<bool, ApiError>;
}

pub trait PatientRepository: Send + Sync {
    async fn list(&self, filter: &PatientFilter) -> Result<Vec<Patient>, ApiError>;
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Patient>, ApiError>;
    async fn create(&self, user_id: EntityId, patient: &NewPatient) -> Result<Patient, ApiError>;
    async fn update(&self, id: EntityId, patch: &PatientPatch) -> Result<Patient, ApiError>;
    async fn delete(&self, id: EntityId) -> Result<bool, ApiError>;
}

// ── Catalog ──────────────────────────────────────────────────────────────────

pub trait ServiceRepository: Send + Sync {
    async fn list(&self, filter: &ServiceFilter) -> Result<Vec<Service>, ApiError>;
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Service>, ApiError>;
    async fn create(&self, service: &NewService) -> Result<Service, ApiError>;
    async fn update(&self, id: EntityId, patch: &ServicePatch) -> Result<Service, ApiError>;
    async fn delete(&self, id: EntityId) -> Result<bool, ApiError>;
}

pub trait CourseRepository: Send + Sync {
    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, ApiError>;
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Course>, ApiError>;

    /// Insert a course. With `posted_by = Some((centre, date))` the `posts`
    /// row is written in the same transaction.
    async fn create(
        &self,
        course: &NewCourse,
        posted_by: Option<(EntityId, NaiveDate)>,
    ) -> Result<Course, ApiError>;

    async fn update(&self, id: EntityId, patch: &CoursePatch) -> Result<Course, ApiError>;

    /// Delete a course, first removing `unlink` in the same transaction.
    async fn delete(&self, id: EntityId, unlink: Option<LinkKey>) -> Result<bool, ApiError>;
}

pub trait ResourceRepository: Send + Sync {
    async fn list(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, ApiError>;
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Resource>, ApiError>;

    /// Insert a resource. With `published_by = Some((therapist, date))` the
    /// `publish` row is written in the same transaction.
    async fn create(
        &self,
        resource: &NewResource,
        published_by: Option<(EntityId, NaiveDate)>,
    ) -> Result<Resource, ApiError>;

    async fn update(&self, id: EntityId, patch: &ResourcePatch) -> Result<Resource, ApiError>;
    async fn delete(&self, id: EntityId, unlink: Option<LinkKey>) -> Result<bool, ApiError>;

    /// Resources ordered by number of `consume` rows, most used first.
    async fn most_consumed(&self, limit: u64) -> Result<Vec<(Resource, u64)>, ApiError>;
}

pub trait InvoiceRepository: Send + Sync {
    async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, ApiError>;
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Invoice>, ApiError>;

    /// Insert an invoice and, when `kind` is given, its sub-table row, in one
    /// transaction. A duplicate number is reported as `InvoiceNumberTaken`.
    async fn create(
        &self,
        invoice: &NewInvoice,
        kind: Option<InvoiceKind>,
    ) -> Result<Invoice, ApiError>;

    async fn update(&self, id: EntityId, patch: &InvoicePatch) -> Result<Invoice, ApiError>;
    async fn delete(&self, id: EntityId) -> Result<bool, ApiError>;
}

// ── Relationships ────────────────────────────────────────────────────────────

pub trait LinkRepository: Send + Sync {
    async fn find(&self, key: LinkKey) -> Result<Option<Link>, ApiError>;

    /// Insert a row. A composite-key violation is reported as `LinkExists`.
    async fn insert(&self, link: &Link) -> Result<(), ApiError>;

    /// Replace the payload of an existing row. Returns `false` if no row matched.
    async fn update_payload(&self, key: LinkKey, payload: &LinkPayload)
    -> Result<bool, ApiError>;

    /// Returns `true` if a row was deleted.
    async fn delete(&self, key: LinkKey) -> Result<bool, ApiError>;

    async fn list_by_left(&self, kind: LinkKind, left: EntityId) -> Result<Vec<Link>, ApiError>;
    async fn list_by_right(&self, kind: LinkKind, right: EntityId)
    -> Result<Vec<Link>, ApiError>;
}
