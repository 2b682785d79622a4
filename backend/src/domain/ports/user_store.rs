//! Port abstraction for user record storage adapters and their errors.
//!
//! The port exposes a compare-and-swap write keyed on the full current
//! content of a record. Every adapter must make the comparison and the write
//! a single atomic step, so two writers that both validated the same version
//! token cannot both succeed.

use async_trait::async_trait;

use crate::domain::{Email, UserRecord};

use super::define_port_error;

define_port_error! {
    /// Storage errors raised by user store adapters.
    pub enum UserStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "user store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user store query failed: {message}",
        /// A record with the same email already exists.
        Duplicate { email: String } => "user already registered: {email}",
        /// The stored record no longer matches the expected content.
        Stale { email: String } => "user record changed concurrently: {email}",
        /// No record exists for the email.
        NotFound { email: String } => "user not found: {email}",
    }
}

/// Outbound port owning user records, keyed by email.
///
/// Implementations must treat [`UserStore::replace_if_unchanged`] as one
/// atomic compare-and-swap.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a record by email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, UserStoreError>;

    /// Insert a new record, failing with [`UserStoreError::Duplicate`] when
    /// the email is taken.
    async fn insert(&self, record: &UserRecord) -> Result<(), UserStoreError>;

    /// Replace `expected` with `replacement` only if the stored record still
    /// equals `expected` field for field.
    ///
    /// Returns [`UserStoreError::Stale`] when the stored content differs and
    /// [`UserStoreError::NotFound`] when the record has been deleted.
    async fn replace_if_unchanged(
        &self,
        expected: &UserRecord,
        replacement: &UserRecord,
    ) -> Result<(), UserStoreError>;

    /// Remove a record, reporting whether one existed.
    async fn delete(&self, email: &Email) -> Result<bool, UserStoreError>;
}
