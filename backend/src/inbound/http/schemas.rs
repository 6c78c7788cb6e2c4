//! OpenAPI schema definitions for response envelopes.
//!
//! [`Envelope`](crate::inbound::http::envelope::Envelope) is generic, so each
//! concrete payload shape gets a schema wrapper here. The wrappers mirror the
//! serialised structure and exist only for documentation.

use serde_json::Value;
use utoipa::ToSchema;

use crate::inbound::http::health::StatusResponse;
use crate::inbound::http::users::UserResponse;

/// Envelope returned for every failure.
#[derive(ToSchema)]
#[schema(as = ErrorEnvelope)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorEnvelopeSchema {
    /// Mirrors the HTTP status code.
    #[schema(example = 404)]
    code: u16,
    /// Human-readable message returned to clients.
    #[schema(example = "User not found")]
    message: String,
    /// Supplementary details; omitted when absent.
    #[schema(example = json!({"id": "3fa85f64-5717-4562-b3fc-2c963f66afa6"}))]
    data: Option<Value>,
}

/// Envelope carrying only a message.
#[derive(ToSchema)]
#[schema(as = MessageEnvelope)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct MessageEnvelopeSchema {
    #[schema(example = 200)]
    code: u16,
    #[schema(example = "Service is healthy")]
    message: String,
}

/// Envelope carrying a single user.
#[derive(ToSchema)]
#[schema(as = UserEnvelope)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserEnvelopeSchema {
    #[schema(example = 200)]
    code: u16,
    #[schema(example = "User retrieved successfully")]
    message: String,
    data: UserResponse,
}

/// Envelope carrying every stored user.
#[derive(ToSchema)]
#[schema(as = UserListEnvelope)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserListEnvelopeSchema {
    #[schema(example = 200)]
    code: u16,
    #[schema(example = "Users retrieved successfully")]
    message: String,
    data: Vec<UserResponse>,
}

/// Envelope carrying the application status.
#[derive(ToSchema)]
#[schema(as = StatusEnvelope)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct StatusEnvelopeSchema {
    #[schema(example = 200)]
    code: u16,
    #[schema(example = "Application status")]
    message: String,
    data: StatusResponse,
}
