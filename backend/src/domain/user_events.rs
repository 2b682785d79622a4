//! Domain events emitted by the user record facade.
//!
//! Events stay transport agnostic; notification adapters decide how to
//! deliver them.

use crate::domain::{Email, TraceId};

/// Event emitted after a user record has been registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCreatedEvent {
    /// Email of the newly registered user.
    pub email: Email,
    /// Correlation identifier of the registering request, when one was in
    /// scope.
    pub trace_id: Option<TraceId>,
}

impl UserCreatedEvent {
    /// Build an event for `email`, capturing the ambient trace identifier.
    pub fn new(email: Email) -> Self {
        Self {
            email,
            trace_id: TraceId::current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_captures_ambient_trace_id() {
        let trace_id = TraceId::generate();
        let email = Email::new("a@b.com").expect("email");
        let event = TraceId::scope(trace_id, async move { UserCreatedEvent::new(email) }).await;
        assert_eq!(event.trace_id, Some(trace_id));
    }
}
