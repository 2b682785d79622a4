//! Reqwest-backed webhook notification adapter.
//!
//! Posts `{"customers_email": "<email>"}` to a fixed endpoint. The adapter
//! owns transport details only: timeout, trace propagation and status
//! mapping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::domain::UserCreatedEvent;
use crate::domain::ports::{NotificationError, NotificationSink};

const TRACE_HEADER: &str = "trace-id";

#[derive(Debug, Serialize)]
struct UserCreatedPayload<'a> {
    customers_email: &'a str,
}

/// Notification sink that POSTs user-created events to a webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotificationSink {
    client: Client,
    endpoint: Url,
}

impl WebhookNotificationSink {
    /// Build a sink with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl NotificationSink for WebhookNotificationSink {
    async fn publish_user_created(
        &self,
        event: &UserCreatedEvent,
    ) -> Result<(), NotificationError> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&UserCreatedPayload {
                customers_email: event.email.as_ref(),
            });
        if let Some(trace_id) = event.trace_id {
            request = request.header(TRACE_HEADER, trace_id.to_string());
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_transport_error(error: reqwest::Error) -> NotificationError {
    if error.is_timeout() {
        NotificationError::timeout(error.to_string())
    } else {
        NotificationError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> NotificationError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            NotificationError::timeout(format!("status {}", status.as_u16()))
        }
        _ => NotificationError::rejected(status.as_u16(), body_preview(body)),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 120;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    compact.chars().take(PREVIEW_CHAR_LIMIT).collect()
}
