pub mod account;
pub mod catalog;
pub mod directory;
pub mod invoice;
pub mod link;
pub mod profile;

use sea_orm::{DbErr, SqlErr, TransactionError};

use cisne_domain::id::EntityId;

use crate::error::ApiError;

/// `true` when the database rejected a write because of a unique or
/// primary-key constraint.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Map a failed write: unique violations become `conflict`, anything else is internal.
pub(crate) fn write_error(err: DbErr, conflict: ApiError, context: &'static str) -> ApiError {
    if is_unique_violation(&err) {
        conflict
    } else {
        ApiError::Internal(anyhow::Error::new(err).context(context))
    }
}

pub(crate) fn internal(err: DbErr, context: &'static str) -> ApiError {
    ApiError::Internal(anyhow::Error::new(err).context(context))
}

/// Unwrap the error of `DatabaseConnection::transaction`, which has already rolled back.
pub(crate) fn txn_error(err: TransactionError<ApiError>, context: &'static str) -> ApiError {
    match err {
        TransactionError::Connection(e) => internal(e, context),
        TransactionError::Transaction(e) => e,
    }
}

pub(crate) fn raw_ids(ids: &[EntityId]) -> Vec<i32> {
    ids.iter().map(|id| id.get()).collect()
}

/// Map a failed update of a row that was expected to exist.
pub(crate) fn update_error(
    err: DbErr,
    missing: ApiError,
    conflict: Option<ApiError>,
    context: &'static str,
) -> ApiError {
    match (err, conflict) {
        (DbErr::RecordNotUpdated, _) => missing,
        (err, Some(conflict)) => write_error(err, conflict, context),
        (err, None) => internal(err, context),
    }
}
