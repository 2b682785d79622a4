//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The session cookie carries only the authenticated user's email.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Email, Error};

pub(crate) const EMAIL_KEY: &str = "email";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated email in the session cookie.
    pub fn persist_email(&self, email: &Email) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(EMAIL_KEY, email.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Authenticated email, if the session carries a valid one.
    pub fn email(&self) -> Result<Option<Email>, Error> {
        let raw = self
            .0
            .get::<String>(EMAIL_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|value| match Email::new(value) {
            Ok(email) => Some(email),
            Err(error) => {
                tracing::warn!(%error, "invalid email in session cookie");
                None
            }
        }))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
