//! User record facade.
//!
//! [`UserRecordService`] owns field validation, merging and the mapping of
//! store failures onto domain errors. It knows nothing about version tokens;
//! the conditional update coordinator layers those on top.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{LoginService, NotificationSink, UserStore, UserStoreError};
use crate::domain::{
    Email, Error, LoginCredentials, TraceId, UserCreatedEvent, UserFields, UserRecord,
    UserValidationError,
};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Facade over the user store and notification sink.
pub struct UserRecordService<S, N> {
    store: Arc<S>,
    notifications: Arc<N>,
}

impl<S, N> Clone for UserRecordService<S, N> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifications: Arc::clone(&self.notifications),
        }
    }
}

impl<S, N> UserRecordService<S, N> {
    /// Create a new service over the given ports.
    pub fn new(store: Arc<S>, notifications: Arc<N>) -> Self {
        Self {
            store,
            notifications,
        }
    }
}

pub(crate) fn map_validation_error(error: UserValidationError) -> Error {
    let details = json!({
        "field": error.field(),
        "code": error.code(),
    });
    match error {
        UserValidationError::MissingField { .. } => Error::missing_field(error.to_string()),
        _ => Error::invalid_data(error.to_string()),
    }
    .with_details(details)
}

fn map_store_error(error: UserStoreError) -> Error {
    match error {
        UserStoreError::Connection { message } => {
            Error::internal(format!("user store unavailable: {message}"))
        }
        UserStoreError::Query { message } => Error::internal(format!("user store error: {message}")),
        UserStoreError::Duplicate { email } => {
            Error::invalid_data(format!("a user is already registered for {email}")).with_details(
                json!({
                    "field": "email",
                    "code": "duplicate_email",
                }),
            )
        }
        UserStoreError::Stale { email } => {
            Error::precondition_failed(format!("user {email} was modified concurrently"))
                .with_details(json!({ "code": "concurrent_update" }))
        }
        UserStoreError::NotFound { email } => not_found(&email),
    }
}

fn not_found(email: &str) -> Error {
    Error::not_found(format!("no user registered for {email}"))
}

impl<S, N> UserRecordService<S, N>
where
    S: UserStore,
    N: NotificationSink + 'static,
{
    /// Read a record.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent, `InternalError` when the store fails.
    pub async fn get(&self, email: &Email) -> Result<UserRecord, Error> {
        self.store
            .find_by_email(email)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| not_found(email.as_ref()))
    }

    /// Validate and persist a new record, then announce it.
    ///
    /// Validation happens before the store is touched. The notification is
    /// dispatched on a separate task and its outcome never affects the
    /// result.
    pub async fn create(&self, fields: &UserFields) -> Result<UserRecord, Error> {
        let record = UserRecord::try_from_fields(fields).map_err(map_validation_error)?;
        self.store.insert(&record).await.map_err(map_store_error)?;
        info!(email = %record.email(), "user registered");
        self.dispatch_created(record.email().clone());
        Ok(record)
    }

    /// Merge `fields` into the stored record without a version check.
    pub async fn update(&self, email: &Email, fields: &UserFields) -> Result<UserRecord, Error> {
        let current = self.get(email).await?;
        self.apply_update(&current, fields).await
    }

    /// Merge `fields` into `current` and write it back with compare-and-swap
    /// against `current`.
    ///
    /// # Errors
    ///
    /// - `InvalidData` when the merge rules reject `fields`.
    /// - `PreconditionFailed` when the stored record no longer equals
    ///   `current`.
    /// - `NotFound` when the record was deleted in the meantime.
    pub async fn apply_update(
        &self,
        current: &UserRecord,
        fields: &UserFields,
    ) -> Result<UserRecord, Error> {
        let updated = current.merged_with(fields).map_err(map_validation_error)?;
        self.store
            .replace_if_unchanged(current, &updated)
            .await
            .map_err(map_store_error)?;
        debug!(email = %updated.email(), "user updated");
        Ok(updated)
    }

    /// Remove a record.
    ///
    /// # Errors
    ///
    /// `NotFound` when no record existed.
    pub async fn delete(&self, email: &Email) -> Result<bool, Error> {
        let deleted = self.store.delete(email).await.map_err(map_store_error)?;
        if !deleted {
            return Err(not_found(email.as_ref()));
        }
        info!(email = %email, "user deleted");
        Ok(true)
    }

    /// Check credentials against the stored record.
    ///
    /// Unknown emails and wrong passwords produce the same `Forbidden`
    /// error.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Email, Error> {
        let Ok(email) = Email::new(credentials.email()) else {
            return Err(Error::forbidden(INVALID_CREDENTIALS));
        };
        let record = self
            .store
            .find_by_email(&email)
            .await
            .map_err(map_store_error)?;
        match record {
            Some(record) if passwords_match(record.password(), credentials.password()) => {
                Ok(email)
            }
            _ => {
                debug!(email = %email, "login rejected");
                Err(Error::forbidden(INVALID_CREDENTIALS))
            }
        }
    }

    fn dispatch_created(&self, email: Email) {
        let sink = Arc::clone(&self.notifications);
        let event = UserCreatedEvent::new(email);
        TraceId::spawn_scoped(async move {
            if let Err(error) = sink.publish_user_created(&event).await {
                warn!(email = %event.email, error = %error, "user created notification failed");
            }
        });
    }
}

/// Constant-time password comparison over fixed-length digests.
fn passwords_match(stored: &str, presented: &str) -> bool {
    blake3::hash(stored.as_bytes()) == blake3::hash(presented.as_bytes())
}

#[async_trait]
impl<S, N> LoginService for UserRecordService<S, N>
where
    S: UserStore,
    N: NotificationSink + 'static,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Email, Error> {
        UserRecordService::authenticate(self, credentials).await
    }
}

#[cfg(test)]
#[path = "user_records_tests.rs"]
mod tests;
