pub mod account;
pub mod centre;
pub mod course;
pub mod invoice;
pub mod link;
pub mod patient;
pub mod resource;
pub mod service;
pub mod therapist;

use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;

use crate::domain::repository::EntityDirectory;
use crate::domain::types::{non_blank, valid_range};
use crate::error::ApiError;

/// Trimmed required text, or `MissingField(field)` when absent or blank.
pub(crate) fn required(value: Option<String>, field: &'static str) -> Result<String, ApiError> {
    non_blank(value).ok_or(ApiError::MissingField(field))
}

/// `NotFound(kind)` unless a row of `kind` with `id` exists.
pub(crate) async fn ensure_exists<D: EntityDirectory>(
    directory: &D,
    kind: EntityKind,
    id: EntityId,
) -> Result<(), ApiError> {
    if directory.exists(kind, id).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound(kind))
    }
}

/// Prices and amounts must not be negative.
pub(crate) fn non_negative(
    value: Option<f64>,
    field: &'static str,
) -> Result<Option<f64>, ApiError> {
    match value {
        Some(v) if v < 0.0 || !v.is_finite() => Err(ApiError::InvalidRange(field)),
        other => Ok(other),
    }
}

/// Reject filters whose lower bound exceeds the upper bound.
pub(crate) fn ordered<T: PartialOrd>(
    min: Option<T>,
    max: Option<T>,
    field: &'static str,
) -> Result<(), ApiError> {
    if valid_range(min, max) {
        Ok(())
    } else {
        Err(ApiError::InvalidRange(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank() {
        assert!(matches!(
            required(Some("   ".into()), "name"),
            Err(ApiError::MissingField("name"))
        ));
        assert_eq!(required(Some(" Clinic ".into()), "name").unwrap(), "Clinic");
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(non_negative(Some(-1.0), "price").is_err());
        assert_eq!(non_negative(Some(0.0), "price").unwrap(), Some(0.0));
        assert_eq!(non_negative(None, "price").unwrap(), None);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        assert!(ordered(Some(10.0), Some(5.0), "price").is_err());
        assert!(ordered(Some(5.0), None, "price").is_ok());
    }
}
