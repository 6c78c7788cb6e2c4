//! Domain-level failure taxonomy.
//!
//! These codes are transport agnostic. Inbound adapters map them onto HTTP
//! status codes and response envelopes.

use std::fmt;

/// Stable failure category shared by every adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The route exists but does not accept the request method.
    MethodNotAllowed,
    /// The request did not complete before the configured deadline.
    RequestTimeout,
    /// A uniqueness invariant would be violated.
    Conflict,
    /// The request is well formed but semantically unusable.
    UnprocessableEntity,
    /// An unexpected fault occurred on the server.
    InternalError,
    /// The service is draining or otherwise unable to take traffic.
    ServiceUnavailable,
}

impl ErrorCode {
    /// Machine-readable name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::RequestTimeout => "request_timeout",
            Self::Conflict => "conflict",
            Self::UnprocessableEntity => "unprocessable_entity",
            Self::InternalError => "internal_error",
            Self::ServiceUnavailable => "service_unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
