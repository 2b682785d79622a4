//! Port for delivering user lifecycle notifications.

use async_trait::async_trait;

use crate::domain::UserCreatedEvent;

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification adapters.
    pub enum NotificationError {
        /// The notification endpoint could not be reached.
        Transport { message: String } => "notification transport failed: {message}",
        /// The endpoint did not answer within the configured timeout.
        Timeout { message: String } => "notification timed out: {message}",
        /// The endpoint answered with a non-success status.
        Rejected { status: u16, message: String } => "notification rejected ({status}): {message}",
    }
}

/// Outbound port for "user created" notifications.
///
/// Callers treat delivery as best effort: failures are logged by the caller
/// and never surface to the client that triggered them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Publish a registration notification.
    async fn publish_user_created(&self, event: &UserCreatedEvent)
    -> Result<(), NotificationError>;
}

/// Sink that accepts and discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotificationSink;

#[async_trait]
impl NotificationSink for NoOpNotificationSink {
    async fn publish_user_created(
        &self,
        _event: &UserCreatedEvent,
    ) -> Result<(), NotificationError> {
        Ok(())
    }
}
