//! HTTP error payloads.
//!
//! [`ApiError`] is the single application error recognised by the HTTP layer.
//! It renders as the standard envelope with its status mirrored in `code` and
//! optional structured details in `data`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::Value;

use crate::domain::ErrorCode;
use crate::inbound::http::envelope::Envelope;

/// Message returned for every internal failure; nothing else leaks.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application error carrying the status, message and details to emit.
///
/// # Examples
/// ```
/// use actix_web::ResponseError;
/// use actix_web::http::StatusCode;
/// use user_service::inbound::http::error::ApiError;
///
/// let err = ApiError::conflict("Username already taken");
/// assert_eq!(err.status_code(), StatusCode::CONFLICT);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    code: ErrorCode,
    status: StatusCode,
    message: String,
    details: Option<Value>,
}

impl ApiError {
    /// Create an error for a taxonomy code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status: status_for(code),
            message: message.into(),
            details: None,
        }
    }

    /// Create an error for an arbitrary status using its canonical reason.
    ///
    /// Used for framework failures that have no taxonomy entry of their own.
    pub fn from_status(status: StatusCode) -> Self {
        let code = if status.is_client_error() {
            ErrorCode::InvalidRequest
        } else {
            ErrorCode::InternalError
        };
        Self {
            code,
            status,
            message: status
                .canonical_reason()
                .unwrap_or(INTERNAL_ERROR_MESSAGE)
                .to_owned(),
            details: None,
        }
    }

    /// Attach structured details, emitted as the envelope `data`.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::MethodNotAllowed`].
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MethodNotAllowed, message)
    }

    /// Convenience constructor for [`ErrorCode::RequestTimeout`].
    pub fn request_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RequestTimeout, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary details for clients.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    fn to_envelope(&self) -> Envelope<Value> {
        let code = self.status.as_u16();
        if self.status.is_server_error() && self.code != ErrorCode::ServiceUnavailable {
            return Envelope::without_data(code, INTERNAL_ERROR_MESSAGE);
        }
        Envelope {
            code,
            message: self.message.clone(),
            data: self.details.clone(),
        }
    }
}

/// Map a taxonomy code onto its HTTP status.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        ErrorCode::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(self.to_envelope())
    }
}

/// Convenience alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;
