//! Builders wiring store and notification adapters into HTTP state.

use std::sync::Arc;

use crate::domain::ports::{NotificationSink, UserStore};
use crate::domain::{ConditionalUpdateCoordinator, TokenSigner, UserRecordService};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryUserStore;
use crate::outbound::notifications::TracingNotificationSink;
use crate::outbound::persistence::DieselUserStore;

use super::config::{NotificationBackend, StoreBackend};

fn wire<S, N>(store: Arc<S>, notifications: Arc<N>, signer: Arc<TokenSigner>) -> HttpState
where
    S: UserStore + 'static,
    N: NotificationSink + 'static,
{
    let records = UserRecordService::new(store, notifications);
    let directory = ConditionalUpdateCoordinator::new(records.clone(), signer);
    HttpState::new(Arc::new(directory), Arc::new(records))
}

fn with_store<S>(store: Arc<S>, notifications: NotificationBackend, signer: Arc<TokenSigner>) -> HttpState
where
    S: UserStore + 'static,
{
    match notifications {
        NotificationBackend::Log => wire(store, Arc::new(TracingNotificationSink), signer),
        NotificationBackend::Webhook(sink) => wire(store, Arc::new(sink), signer),
    }
}

/// Build handler state for the selected backends.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use user_directory::domain::TokenSigner;
/// use user_directory::server::{NotificationBackend, StoreBackend, build_http_state};
///
/// let signer = Arc::new(TokenSigner::derive_from(b"secret"));
/// let state = build_http_state(StoreBackend::Memory, NotificationBackend::Log, signer);
/// let _directory = state.directory.clone();
/// ```
pub fn build_http_state(
    store: StoreBackend,
    notifications: NotificationBackend,
    signer: Arc<TokenSigner>,
) -> HttpState {
    match store {
        StoreBackend::Memory => with_store(Arc::new(InMemoryUserStore::new()), notifications, signer),
        StoreBackend::Postgres(pool) => {
            with_store(Arc::new(DieselUserStore::new(pool)), notifications, signer)
        }
    }
}
