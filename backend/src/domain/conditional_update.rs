//! Conditional update coordinator.
//!
//! The coordinator implements the [`UserDirectory`] driving port on top of
//! [`UserRecordService`]. Every write goes through the same sequence:
//!
//! 1. Fetch the current record (absent records are `NotFound`).
//! 2. Recompute its version token.
//! 3. Classify the presented token with [`TokenCheck`].
//! 4. On a match, merge and write with compare-and-swap against the fetched
//!    record, so a writer that lost a race after step 3 still fails.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{NotificationSink, UserDirectory, UserStore, VersionedUser};
use crate::domain::{
    Email, Error, TokenSigner, UserFields, UserRecord, UserRecordService, VersionToken,
};

/// Outcome of comparing a presented token with the current record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    /// The client sent no token.
    Absent,
    /// The token does not match the current record.
    Stale,
    /// The token matches the current record.
    Current,
}

impl TokenCheck {
    /// Classify `presented` against `record`.
    pub fn evaluate(
        signer: &TokenSigner,
        record: &UserRecord,
        presented: Option<&VersionToken>,
    ) -> Self {
        match presented {
            None => Self::Absent,
            Some(token) if signer.matches(record, token) => Self::Current,
            Some(_) => Self::Stale,
        }
    }
}

/// Version-token gate in front of the user record facade.
pub struct ConditionalUpdateCoordinator<S, N> {
    records: UserRecordService<S, N>,
    signer: Arc<TokenSigner>,
}

impl<S, N> ConditionalUpdateCoordinator<S, N> {
    /// Create a coordinator over `records`, signing with `signer`.
    pub fn new(records: UserRecordService<S, N>, signer: Arc<TokenSigner>) -> Self {
        Self { records, signer }
    }

    fn versioned(&self, record: UserRecord) -> VersionedUser {
        let token = self.signer.compute_token(&record);
        VersionedUser { record, token }
    }
}

#[async_trait]
impl<S, N> UserDirectory for ConditionalUpdateCoordinator<S, N>
where
    S: UserStore,
    N: NotificationSink + 'static,
{
    async fn fetch(&self, email: &Email) -> Result<VersionedUser, Error> {
        let record = self.records.get(email).await?;
        Ok(self.versioned(record))
    }

    async fn register(&self, fields: UserFields) -> Result<VersionedUser, Error> {
        let record = self.records.create(&fields).await?;
        Ok(self.versioned(record))
    }

    async fn update(
        &self,
        email: &Email,
        presented: Option<VersionToken>,
        fields: UserFields,
    ) -> Result<VersionedUser, Error> {
        let current = self.records.get(email).await?;
        match TokenCheck::evaluate(&self.signer, &current, presented.as_ref()) {
            TokenCheck::Absent => Err(Error::precondition_required(
                "a version token is required to update a user",
            )
            .with_details(json!({ "code": "missing_token" }))),
            TokenCheck::Stale => {
                debug!(email = %email, "rejected update with stale version token");
                Err(
                    Error::precondition_failed("version token does not match the current record")
                        .with_details(json!({ "code": "stale_token" })),
                )
            }
            TokenCheck::Current => {
                let updated = self.records.apply_update(&current, &fields).await?;
                Ok(self.versioned(updated))
            }
        }
    }

    async fn delete(&self, email: &Email) -> Result<(), Error> {
        self.records.delete(email).await.map(drop)
    }
}

#[cfg(test)]
#[path = "conditional_update_tests.rs"]
mod tests;
