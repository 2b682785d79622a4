//! Notification sink that records events in the service log.

use async_trait::async_trait;
use tracing::info;

use crate::domain::UserCreatedEvent;
use crate::domain::ports::{NotificationError, NotificationSink};

/// Logs each event at `info` and never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn publish_user_created(
        &self,
        event: &UserCreatedEvent,
    ) -> Result<(), NotificationError> {
        info!(
            email = %event.email,
            trace_id = event.trace_id.map(|id| id.to_string()),
            "user created"
        );
        Ok(())
    }
}
