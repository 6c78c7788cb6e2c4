//! Uniform response envelope.
//!
//! Every JSON response body, success or failure, has the shape
//! `{"code": <status>, "message": "...", "data": ...}`. `data` is omitted when
//! absent. `204 No Content` responses carry no body at all.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Response wrapper shared by every endpoint.
///
/// # Examples
/// ```
/// use user_service::inbound::http::envelope::Envelope;
///
/// let body = serde_json::to_string(&Envelope::<()>::without_data(200, "ok"))
///     .expect("serialises");
/// assert_eq!(body, r#"{"code":200,"message":"ok"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Mirrors the HTTP status code.
    pub code: u16,
    /// Human-readable outcome.
    pub message: String,
    /// Optional payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Envelope carrying a payload.
    pub fn with_data(code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Envelope with only a code and message.
    pub fn without_data(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> Envelope<T> {
    /// Render the envelope with the status it mirrors.
    pub fn into_response(self) -> HttpResponse {
        let status =
            StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        HttpResponse::build(status).json(self)
    }
}

/// `200 OK` with a payload.
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> HttpResponse {
    Envelope::with_data(StatusCode::OK.as_u16(), message, data).into_response()
}

/// `200 OK` without a payload.
pub fn ok_message(message: impl Into<String>) -> HttpResponse {
    Envelope::<()>::without_data(StatusCode::OK.as_u16(), message).into_response()
}

/// `201 Created` with the new resource.
pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> HttpResponse {
    Envelope::with_data(StatusCode::CREATED.as_u16(), message, data).into_response()
}

/// `204 No Content` with an empty body.
pub fn no_content() -> HttpResponse {
    HttpResponse::NoContent().finish()
}
