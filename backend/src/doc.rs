//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: the versioned user and health endpoints plus the probes.
//!   Legacy aliases share these handlers and are not documented separately.
//! - **Schemas**: request bodies, the user payload and the envelope wrappers
//!   from [`crate::inbound::http::schemas`].
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::health::StatusResponse;
use crate::inbound::http::schemas::{
    ErrorEnvelopeSchema, MessageEnvelopeSchema, StatusEnvelopeSchema, UserEnvelopeSchema,
    UserListEnvelopeSchema,
};
use crate::inbound::http::users::{CreateUserRequest, UpdateUserRequest, UserResponse};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User service API",
        description = "Health checks and user management over a JSON envelope API."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::health,
        crate::inbound::http::health::status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CreateUserRequest,
        UpdateUserRequest,
        UserResponse,
        StatusResponse,
        ErrorEnvelopeSchema,
        MessageEnvelopeSchema,
        UserEnvelopeSchema,
        UserListEnvelopeSchema,
        StatusEnvelopeSchema,
    )),
    tags(
        (name = "users", description = "Operations related to users"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
