//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, UserDirectory};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub directory: Arc<dyn UserDirectory>,
    pub login: Arc<dyn LoginService>,
}

impl HttpState {
    /// Bundle the driving ports used by the handlers.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use user_directory::domain::ports::NoOpNotificationSink;
    /// use user_directory::domain::{
    ///     ConditionalUpdateCoordinator, TokenSigner, UserRecordService,
    /// };
    /// use user_directory::inbound::http::state::HttpState;
    /// use user_directory::outbound::memory::InMemoryUserStore;
    ///
    /// let records = UserRecordService::new(
    ///     Arc::new(InMemoryUserStore::default()),
    ///     Arc::new(NoOpNotificationSink),
    /// );
    /// let signer = Arc::new(TokenSigner::derive_from(b"secret"));
    /// let directory = ConditionalUpdateCoordinator::new(records.clone(), signer);
    /// let state = HttpState::new(Arc::new(directory), Arc::new(records));
    /// let _directory = state.directory.clone();
    /// ```
    pub fn new(directory: Arc<dyn UserDirectory>, login: Arc<dyn LoginService>) -> Self {
        Self { directory, login }
    }
}
