//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};

use crate::domain::TokenSigner;
use crate::outbound::notifications::WebhookNotificationSink;
use crate::outbound::persistence::DbPool;

/// Where user records are stored.
#[derive(Clone)]
pub enum StoreBackend {
    /// Process-local map; contents are lost on restart.
    Memory,
    /// PostgreSQL through the Diesel pool.
    Postgres(DbPool),
}

/// Where "user created" notifications go.
#[derive(Clone)]
pub enum NotificationBackend {
    /// Structured log lines only.
    Log,
    /// HTTP webhook.
    Webhook(WebhookNotificationSink),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) signer: Arc<TokenSigner>,
    pub(crate) store: StoreBackend,
    pub(crate) notifications: NotificationBackend,
}

impl ServerConfig {
    /// Construct a configuration backed by the in-memory store and the
    /// logging notification sink.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        signer: TokenSigner,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            signer: Arc::new(signer),
            store: StoreBackend::Memory,
            notifications: NotificationBackend::Log,
        }
    }

    /// Persist records in PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.store = StoreBackend::Postgres(pool);
        self
    }

    /// Deliver notifications to a webhook.
    #[must_use]
    pub fn with_webhook(mut self, sink: WebhookNotificationSink) -> Self {
        self.notifications = NotificationBackend::Webhook(sink);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
