//! Diesel and pool error mapping onto document repository errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::DocumentId;
use crate::domain::ports::DocumentRepositoryError;

use super::pool::PoolError;

/// Map pool errors to repository connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> DocumentRepositoryError {
    DocumentRepositoryError::connection(error.message())
}

/// Map Diesel errors to repository errors.
///
/// `duplicate` names the identifier reported when the statement hit the
/// primary key; statements that cannot collide pass `None`.
pub(crate) fn map_diesel_error(
    error: DieselError,
    duplicate: Option<DocumentId>,
) -> DocumentRepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DocumentRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => DocumentRepositoryError::query("database query error"),
        DieselError::SerializationError(err) | DieselError::DeserializationError(err) => {
            DocumentRepositoryError::serialization(err.to_string())
        }
        DieselError::DatabaseError(kind, _) => match (kind, duplicate) {
            (DatabaseErrorKind::UniqueViolation, Some(id)) => DocumentRepositoryError::duplicate(id),
            (DatabaseErrorKind::UniqueViolation, None) => {
                DocumentRepositoryError::query("unique constraint violated")
            }
            (DatabaseErrorKind::ClosedConnection, _) => {
                DocumentRepositoryError::connection("database connection error")
            }
            _ => DocumentRepositoryError::query("database error"),
        },
        _ => DocumentRepositoryError::query("database error"),
    }
}
