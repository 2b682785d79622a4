//! Registration handler.
//!
//! ```text
//! POST /api/v1/registrations {"last_name":"Xu","first_name":"Una","email":"u@x.com","password":"pw"}
//! ```

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, post, web};
use serde_json::{Map, Value};

use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, RegistrationSchema, UserResponseSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{fields_from_body, versioned_response};

/// Register a user and return the stored record with its first token.
///
/// Keys beyond the core fields are stored as extension attributes.
#[utoipa::path(
    post,
    path = "/api/v1/registrations",
    request_body = RegistrationSchema,
    responses(
        (status = 200, description = "Registered user and token", body = UserResponseSchema,
            headers(("ETag" = String, description = "Version token"))),
        (status = 400, description = "Missing or invalid field", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/registrations")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let fields = fields_from_body(payload.into_inner());
    let created = state.directory.register(fields).await?;
    Ok(versioned_response(StatusCode::OK, &created))
}
