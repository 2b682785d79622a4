//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their wire shape and exist only for documentation.

use serde::Serialize;
use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// A required field is absent.
    MissingField,
    /// A field or body is malformed.
    InvalidData,
    /// A conditional write arrived without a version token.
    PreconditionRequired,
    /// The presented version token is not current.
    PreconditionFailed,
    /// Credentials were rejected.
    Forbidden,
    /// The requested user does not exist.
    NotFound,
    /// An unexpected error occurred on the server.
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = crate::domain::Error)]
#[allow(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "precondition_failed")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "version token does not match the current record")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details, usually `{ "field", "code" }`.
    details: Option<serde_json::Value>,
}

/// A user record as returned to clients: core fields, extension attributes
/// and the current version token. The password is never returned.
#[derive(ToSchema)]
#[allow(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct UserResponseSchema {
    #[schema(example = "u@x.com")]
    email: String,
    #[schema(example = "Una")]
    first_name: String,
    #[schema(example = "Xu")]
    last_name: String,
    /// Version token; present it as `If-Match` on the next update.
    #[schema(example = "9f2c4e0b7a...")]
    token: String,
}

/// Registration body. Keys beyond the core fields are stored as extension
/// attributes.
#[derive(ToSchema)]
#[allow(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct RegistrationSchema {
    #[schema(example = "Xu")]
    last_name: String,
    #[schema(example = "Una")]
    first_name: String,
    #[schema(example = "u@x.com")]
    email: String,
    #[schema(example = "correct horse")]
    password: String,
}

/// Partial update body. Present keys replace stored values; extension
/// attributes are merged.
#[derive(ToSchema)]
#[allow(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct UserFieldsSchema {
    first_name: Option<String>,
    last_name: Option<String>,
    password: Option<String>,
}
