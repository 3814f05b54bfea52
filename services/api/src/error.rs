use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use cisne_core::envelope::failure;
use cisne_domain::entity::EntityKind;
use cisne_domain::link::LinkKind;

/// API error variants, grouped by the status they map to.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // validation
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password must be at least 6 characters")]
    PasswordTooShort,
    #[error("unsupported role: {0}")]
    UnsupportedRole(String),
    #[error("user role does not match {0} profile")]
    ProfileRoleMismatch(EntityKind),
    #[error("nothing to update")]
    EmptyUpdate,
    #[error("invalid range: {0}")]
    InvalidRange(&'static str),

    // authentication
    #[error("invalid credentials")]
    InvalidCredentials,

    // authorization
    #[error("forbidden: role")]
    ForbiddenRole,
    #[error("forbidden: not owner")]
    ForbiddenNotOwner,
    #[error("course is not offered by any centre employing this therapist")]
    CourseNotOffered,

    // not found (also raised when a referenced row is missing)
    #[error("{0} not found")]
    NotFound(EntityKind),
    #[error("{0} relationship not found")]
    LinkNotFound(LinkKind),

    // conflict
    #[error("email already registered")]
    EmailTaken,
    #[error("nif already registered as therapist")]
    NifTakenByTherapist,
    #[error("nif already registered as patient")]
    NifTakenByPatient,
    #[error("cif already registered")]
    CifTaken,
    #[error("invoice number already exists")]
    InvoiceNumberTaken,
    #[error("user already has a profile")]
    ProfileExists,
    #[error("{0} relationship already exists")]
    LinkExists(LinkKind),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::PasswordTooShort => "PASSWORD_TOO_SHORT",
            Self::UnsupportedRole(_) => "UNSUPPORTED_ROLE",
            Self::ProfileRoleMismatch(_) => "PROFILE_ROLE_MISMATCH",
            Self::EmptyUpdate => "EMPTY_UPDATE",
            Self::InvalidRange(_) => "INVALID_RANGE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::ForbiddenRole => "FORBIDDEN_ROLE",
            Self::ForbiddenNotOwner => "FORBIDDEN_NOT_OWNER",
            Self::CourseNotOffered => "COURSE_NOT_OFFERED",
            Self::NotFound(kind) => not_found_kind(*kind),
            Self::LinkNotFound(_) => "RELATIONSHIP_NOT_FOUND",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::NifTakenByTherapist => "NIF_TAKEN_BY_THERAPIST",
            Self::NifTakenByPatient => "NIF_TAKEN_BY_PATIENT",
            Self::CifTaken => "CIF_TAKEN",
            Self::InvoiceNumberTaken => "INVOICE_NUMBER_TAKEN",
            Self::ProfileExists => "PROFILE_EXISTS",
            Self::LinkExists(_) => "RELATIONSHIP_EXISTS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_)
            | Self::InvalidEmail
            | Self::PasswordTooShort
            | Self::UnsupportedRole(_)
            | Self::ProfileRoleMismatch(_)
            | Self::EmptyUpdate
            | Self::InvalidRange(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::ForbiddenRole | Self::ForbiddenNotOwner | Self::CourseNotOffered => {
                StatusCode::FORBIDDEN
            }
            Self::NotFound(_) | Self::LinkNotFound(_) => StatusCode::NOT_FOUND,
            Self::EmailTaken
            | Self::NifTakenByTherapist
            | Self::NifTakenByPatient
            | Self::CifTaken
            | Self::InvoiceNumberTaken
            | Self::ProfileExists
            | Self::LinkExists(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn not_found_kind(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::User => "USER_NOT_FOUND",
        EntityKind::Centre => "CENTRE_NOT_FOUND",
        EntityKind::Therapist => "THERAPIST_NOT_FOUND",
        EntityKind::Patient => "PATIENT_NOT_FOUND",
        EntityKind::Service => "SERVICE_NOT_FOUND",
        EntityKind::Course => "COURSE_NOT_FOUND",
        EntityKind::Resource => "RESOURCE_NOT_FOUND",
        EntityKind::Invoice => "INVOICE_NOT_FOUND",
        EntityKind::ServiceInvoice => "SERVICE_INVOICE_NOT_FOUND",
        EntityKind::CourseInvoice => "COURSE_INVOICE_NOT_FOUND",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // The cause of a 500 goes to the log only; clients always get the sanitized message.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        failure(self.status(), self.kind(), self.to_string())
    }
}
