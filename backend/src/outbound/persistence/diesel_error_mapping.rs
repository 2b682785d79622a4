//! Diesel error mapping for the user store adapter.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::UserStoreError;

use super::pool::PoolError;

/// Map pool failures, including checkout timeouts, to connection errors.
pub(super) fn map_pool_error(error: PoolError) -> UserStoreError {
    UserStoreError::connection(error.into_message())
}

/// Map Diesel failures to store errors, keeping database detail out of the
/// message.
pub(super) fn map_diesel_error(error: DieselError) -> UserStoreError {
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
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserStoreError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => UserStoreError::query("database query error"),
        _ => UserStoreError::query("database error"),
    }
}

/// Map insert failures, turning primary key violations into duplicates.
pub(super) fn map_insert_error(error: DieselError, email: &str) -> UserStoreError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            UserStoreError::duplicate(email)
        }
        other => map_diesel_error(other),
    }
}
