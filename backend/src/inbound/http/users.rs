//! User resource handlers.
//!
//! ```text
//! GET    /api/v1/users/{email}   -> 200 record + token, ETag
//! PUT    /api/v1/users/{email}   If-Match: "<token>" {"first_name":"New"}
//! DELETE /api/v1/users/{email}   -> {"deleted":true}
//! ```
//!
//! Response bodies are the stored record without its password, plus a
//! `token` field carrying the version token also sent as `ETag`.

use actix_web::http::StatusCode;
use actix_web::http::header::ETAG;
use actix_web::{HttpRequest, HttpResponse, delete, get, put, web};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::ports::VersionedUser;
use crate::domain::{Email, Error, PASSWORD_FIELD, UserFields, VersionToken};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::preconditions::{entity_tag, read_precondition, write_precondition};
use crate::inbound::http::schemas::{ErrorSchema, UserFieldsSchema, UserResponseSchema};
use crate::inbound::http::state::HttpState;

/// Body field carrying the version token.
pub const TOKEN_FIELD: &str = "token";

/// Path parameters for `/users/{email}`.
#[derive(Debug, Deserialize)]
pub struct UserPath {
    email: String,
}

/// Response body for `DELETE /api/v1/users/{email}`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    /// Always `true` on success.
    pub deleted: bool,
}

/// Body of a versioned user response: the record without its password,
/// plus `token`.
pub(crate) fn versioned_body(versioned: &VersionedUser) -> Value {
    let mut body = match versioned.record.to_json() {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    body.remove(PASSWORD_FIELD);
    body.insert(
        TOKEN_FIELD.to_owned(),
        Value::from(versioned.token.as_str()),
    );
    Value::Object(body)
}

/// Build a response carrying a record, its token and the matching headers.
pub(crate) fn versioned_response(status: StatusCode, versioned: &VersionedUser) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((ETAG, entity_tag(&versioned.token)))
        .insert_header(private_no_cache_header())
        .json(versioned_body(versioned))
}

/// Turn a client-submitted object into domain fields, dropping any echoed
/// `token` key.
pub(crate) fn fields_from_body(mut body: Map<String, Value>) -> UserFields {
    body.remove(TOKEN_FIELD);
    UserFields::new(body)
}

fn parse_path_email(path: UserPath) -> Result<Email, Error> {
    Email::new(path.email).map_err(|_| Error::not_found("user not found"))
}

fn matches_current(presented: Option<VersionToken>, versioned: &VersionedUser) -> bool {
    presented.is_some_and(|token| token.same_as(&versioned.token))
}

/// Fetch a user with its current version token.
///
/// Answers `304 Not Modified` when `If-None-Match` carries the current token.
#[utoipa::path(
    get,
    path = "/api/v1/users/{email}",
    params(
        ("email" = String, Path, description = "User email"),
        ("If-None-Match" = Option<String>, Header, description = "Previously seen version token")
    ),
    responses(
        (status = 200, description = "User record and token", body = UserResponseSchema,
            headers(("ETag" = String, description = "Current version token"))),
        (status = 304, description = "Token still current"),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{email}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<UserPath>,
) -> ApiResult<HttpResponse> {
    let email = parse_path_email(path.into_inner())?;
    let versioned = state.directory.fetch(&email).await?;
    if matches_current(read_precondition(&req), &versioned) {
        return Ok(HttpResponse::NotModified()
            .insert_header((ETAG, entity_tag(&versioned.token)))
            .insert_header(private_no_cache_header())
            .finish());
    }
    Ok(versioned_response(StatusCode::OK, &versioned))
}

/// Update a user, guarded by the version token in `If-Match`.
#[utoipa::path(
    put,
    path = "/api/v1/users/{email}",
    request_body = UserFieldsSchema,
    params(
        ("email" = String, Path, description = "User email"),
        ("If-Match" = Option<String>, Header, description = "Current version token")
    ),
    responses(
        (status = 200, description = "Updated record and new token", body = UserResponseSchema,
            headers(("ETag" = String, description = "New version token"))),
        (status = 400, description = "Missing or stale token, or invalid fields", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{email}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<UserPath>,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let email = parse_path_email(path.into_inner())?;
    let presented = write_precondition(&req);
    let fields = fields_from_body(payload.into_inner());
    let updated = state.directory.update(&email, presented, fields).await?;
    Ok(versioned_response(StatusCode::OK, &updated))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{email}",
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, description = "User deleted", body = DeleteResponse),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{email}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<UserPath>,
) -> ApiResult<web::Json<DeleteResponse>> {
    let email = parse_path_email(path.into_inner())?;
    state.directory.delete(&email).await?;
    Ok(web::Json(DeleteResponse { deleted: true }))
}
