//! Domain primitives, services and ports.
//!
//! Purpose: hold the user record model, the version token scheme and the
//! services that enforce the conditional-update protocol. Nothing in here
//! depends on actix, diesel or reqwest; adapters live in `inbound` and
//! `outbound`.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - UserRecord / UserFields / Email: the record model and its inputs.
//! - VersionToken / TokenSigner: keyed digests used as preconditions.
//! - UserRecordService: validation, merging and store access.
//! - ConditionalUpdateCoordinator: token-gated writes (`UserDirectory`).

pub mod auth;
pub mod conditional_update;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_events;
pub mod user_records;
pub mod version_token;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::conditional_update::{ConditionalUpdateCoordinator, TokenCheck};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_FIELD, Email, FIRST_NAME_FIELD, LAST_NAME_FIELD, PASSWORD_FIELD,
    REQUIRED_CREATE_FIELDS, UserFields, UserRecord, UserValidationError,
};
pub use self::user_events::UserCreatedEvent;
pub use self::user_records::UserRecordService;
pub use self::version_token::{TokenSigner, VersionToken};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use user_directory::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
