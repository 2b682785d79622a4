//! Driving port for the user resource.
//!
//! HTTP handlers depend on [`UserDirectory`] only, so handler tests can swap
//! in a mock instead of wiring a store, a signer and a notification sink.

use async_trait::async_trait;

use crate::domain::{Email, Error, UserFields, UserRecord, VersionToken};

/// A user record paired with its current version token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedUser {
    /// The stored record.
    pub record: UserRecord,
    /// Token computed from `record`.
    pub token: VersionToken,
}

/// Domain use-case port for reading and mutating user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Read a record and its current token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::NotFound`] when no record exists.
    async fn fetch(&self, email: &Email) -> Result<VersionedUser, Error>;

    /// Register a new user from client-submitted fields.
    async fn register(&self, fields: UserFields) -> Result<VersionedUser, Error>;

    /// Apply `fields` only if `presented` is the record's current token.
    ///
    /// # Errors
    ///
    /// - `PreconditionRequired` when no token was presented.
    /// - `PreconditionFailed` when the token is stale or a concurrent writer
    ///   won the race.
    /// - `NotFound` when the record does not exist.
    async fn update(
        &self,
        email: &Email,
        presented: Option<VersionToken>,
        fields: UserFields,
    ) -> Result<VersionedUser, Error>;

    /// Delete a record.
    async fn delete(&self, email: &Email) -> Result<(), Error>;
}
