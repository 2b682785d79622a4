//! Notification sink adapters.

mod tracing_sink;
mod webhook_sink;

pub use tracing_sink::TracingNotificationSink;
pub use webhook_sink::WebhookNotificationSink;
