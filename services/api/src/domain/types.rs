use chrono::NaiveDate;

use cisne_domain::id::EntityId;
use cisne_domain::link::Link;
use cisne_domain::role::Role;

/// Minimum accepted plaintext password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Last name stored when a display name has a single word.
pub const LAST_NAME_PLACEHOLDER: &str = "-";

/// Emails are compared case-insensitively by storing them trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Cheap shape check: one `@`, non-empty local part, a dot in the domain, no spaces.
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
}

/// NIF and CIF are stored trimmed and upper-cased.
pub fn normalize_natural_key(key: &str) -> String {
    key.trim().to_uppercase()
}

/// `true` unless both bounds are present and `min > max`.
pub fn valid_range<T: PartialOrd>(min: Option<T>, max: Option<T>) -> bool {
    match (min, max) {
        (Some(min), Some(max)) => min <= max,
        _ => true,
    }
}

/// Trimmed text, or `None` when absent or blank.
pub fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_owned()).filter(|t| !t.is_empty())
}

// ── Names ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub first: String,
    pub last: String,
}

impl PersonName {
    /// Split a display name at the first whitespace boundary. Runs of
    /// whitespace collapse; a single word gets [`LAST_NAME_PLACEHOLDER`].
    /// Returns `None` for a blank name.
    pub fn split(full_name: &str) -> Option<Self> {
        let mut words = full_name.split_whitespace();
        let first = words.next()?.to_owned();
        let rest: Vec<&str> = words.collect();
        let last = if rest.is_empty() {
            LAST_NAME_PLACEHOLDER.to_owned()
        } else {
            rest.join(" ")
        };
        Some(Self { first, last })
    }
}

/// Rows addressable by a single numeric id.
pub trait Identified {
    fn entity_id(&self) -> EntityId;
}

/// An entity together with the relationship row that connects it to the anchor.
#[derive(Debug, Clone)]
pub struct Linked<T> {
    pub item: T,
    pub link: Link,
}

// ── Accounts ─────────────────────────────────────────────────────────────────

/// Login identity.
#[derive(Debug, Clone)]
pub struct User {
    pub id: EntityId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Role-specific profile created together with its user.
#[derive(Debug, Clone)]
pub enum NewProfile {
    Centre(NewCentre),
    Therapist(NewTherapist),
    Patient(NewPatient),
}

impl NewProfile {
    pub fn role(&self) -> Role {
        match self {
            Self::Centre(_) => Role::Centre,
            Self::Therapist(_) => Role::Therapist,
            Self::Patient(_) => Role::Patient,
        }
    }
}

/// Everything persisted by one registration.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub profile: NewProfile,
}

// ── Centres ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Centre {
    pub user_id: EntityId,
    pub cif: String,
    pub name: String,
    pub location: Option<String>,
    pub service_id: Option<EntityId>,
}

#[derive(Debug, Clone)]
pub struct NewCentre {
    pub cif: String,
    pub name: String,
    pub location: Option<String>,
    pub service_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct CentrePatch {
    pub cif: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub service_id: Option<EntityId>,
}

impl CentrePatch {
    pub fn is_empty(&self) -> bool {
        self.cif.is_none()
            && self.name.is_none()
            && self.location.is_none()
            && self.service_id.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CentreFilter {
    pub name: Option<String>,
    pub location: Option<String>,
    pub cif: Option<String>,
}

// ── Therapists ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Therapist {
    pub user_id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub nif: String,
    pub society_id: Option<String>,
    pub profession: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTherapist {
    pub first_name: String,
    pub last_name: String,
    pub nif: String,
    pub society_id: Option<String>,
    pub profession: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TherapistPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nif: Option<String>,
    pub society_id: Option<String>,
    pub profession: Option<String>,
}

impl TherapistPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.nif.is_none()
            && self.society_id.is_none()
            && self.profession.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TherapistFilter {
    pub name: Option<String>,
    pub profession: Option<String>,
}

// ── Patients ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub user_id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub nif: String,
    pub diagnosis: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub nif: String,
    pub diagnosis: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PatientPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nif: Option<String>,
    pub diagnosis: Option<String>,
}

impl PatientPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.nif.is_none()
            && self.diagnosis.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatientFilter {
    pub name: Option<String>,
    pub diagnosis: Option<String>,
}

// ── Services ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub id: EntityId,
    pub invoice_id: Option<EntityId>,
    pub name: String,
    pub price: Option<f64>,
    pub tools: Option<String>,
    pub room: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub invoice_id: Option<EntityId>,
    pub name: String,
    pub price: Option<f64>,
    pub tools: Option<String>,
    pub room: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct ServicePatch {
    pub invoice_id: Option<EntityId>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub tools: Option<String>,
    pub room: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ServicePatch {
    pub fn is_empty(&self) -> bool {
        self.invoice_id.is_none()
            && self.name.is_none()
            && self.price.is_none()
            && self.tools.is_none()
            && self.room.is_none()
            && self.date.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    pub name: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Only services dated on or after this day, or undated.
    pub available_from: Option<NaiveDate>,
}

// ── Courses ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: EntityId,
    pub invoice_id: Option<EntityId>,
    pub name: String,
    pub teacher: Option<String>,
    pub price: Option<f64>,
    pub course_type: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub invoice_id: Option<EntityId>,
    pub name: String,
    pub teacher: Option<String>,
    pub price: Option<f64>,
    pub course_type: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct CoursePatch {
    pub invoice_id: Option<EntityId>,
    pub name: Option<String>,
    pub teacher: Option<String>,
    pub price: Option<f64>,
    pub course_type: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl CoursePatch {
    pub fn is_empty(&self) -> bool {
        self.invoice_id.is_none()
            && self.name.is_none()
            && self.teacher.is_none()
            && self.price.is_none()
            && self.course_type.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub name: Option<String>,
    pub teacher: Option<String>,
    pub course_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Only courses dated on or after this day, or undated.
    pub available_from: Option<NaiveDate>,
}

// ── Resources ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: EntityId,
    pub name: String,
    pub resource_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewResource {
    pub name: String,
    pub resource_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourcePatch {
    pub name: Option<String>,
    pub resource_type: Option<String>,
    pub description: Option<String>,
}

impl ResourcePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.resource_type.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    pub name: Option<String>,
    pub resource_type: Option<String>,
    /// Substring searched in name and description.
    pub search: Option<String>,
}

// ── Invoices ─────────────────────────────────────────────────────────────────

/// Which invoice sub-table an invoice is registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceKind {
    Service,
    Course,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: EntityId,
    pub kind: Option<InvoiceKind>,
    pub number: String,
    pub date: NaiveDate,
    pub tax_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub number: String,
    pub date: NaiveDate,
    pub tax_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InvoicePatch {
    pub number: Option<String>,
    pub date: Option<NaiveDate>,
    pub tax_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
}

impl InvoicePatch {
    pub fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.date.is_none()
            && self.tax_amount.is_none()
            && self.payment_method.is_none()
            && self.payment_status.is_none()
    }
}

/// Payment status that marks an invoice as outstanding.
pub const PENDING_PAYMENT: &str = "pending";

#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub kind: Option<InvoiceKind>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// ── Identified ───────────────────────────────────────────────────────────────

impl Identified for Centre {
    fn entity_id(&self) -> EntityId {
        self.user_id
    }
}

impl Identified for Therapist {
    fn entity_id(&self) -> EntityId {
        self.user_id
    }
}

impl Identified for Patient {
    fn entity_id(&self) -> EntityId {
        self.user_id
    }
}

impl Identified for Service {
    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl Identified for Course {
    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl Identified for Resource {
    fn entity_id(&self) -> EntityId {
        self.id
    }
}
