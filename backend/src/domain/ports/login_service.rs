//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to authenticate credentials without knowing the
//! backing store.

use async_trait::async_trait;

use crate::domain::{Email, Error, LoginCredentials};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user's email.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Email, Error>;
}
