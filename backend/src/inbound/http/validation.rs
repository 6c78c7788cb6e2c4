//! Shared validation helpers for inbound HTTP adapters.

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::domain::UserValidationError;
use crate::inbound::http::error::ApiError;

/// Validation error codes for request failures detected before domain
/// validation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: &str, reason: String) -> ApiError {
    ApiError::invalid_request(format!("Validation error on field '{field}'")).with_details(json!({
        "field": field,
        "code": code,
        "message": reason,
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> ApiError {
    let field = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField.as_str(),
        format!("missing required field: {field}"),
    )
}

/// Require an optional request field to be present.
pub(crate) fn required(value: Option<String>, field: FieldName) -> Result<String, ApiError> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Translate a domain validation failure into a field-level client error.
pub(crate) fn map_user_validation_error(err: UserValidationError) -> ApiError {
    field_error(err.field(), err.code(), err.to_string())
}

/// Parse a JSON request body that the handler reads manually.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| invalid_body_error(&err))
}

/// Uniform error for bodies that fail to deserialise.
pub(crate) fn invalid_body_error(err: &dyn std::fmt::Display) -> ApiError {
    ApiError::invalid_request(format!("Invalid request body: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;
    use serde::Deserialize;

    #[test]
    fn missing_field_names_the_field() {
        let err = required(None, FieldName::new("email")).expect_err("missing");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Validation error on field 'email'");
        let details = err.details().expect("details");
        assert_eq!(details["field"], "email");
        assert_eq!(details["code"], "missing_field");
    }

    #[test]
    fn domain_validation_maps_to_field_details() {
        let err = map_user_validation_error(UserValidationError::InvalidEmail);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "email");
        assert_eq!(details["code"], "invalid_email");
        assert_eq!(details["message"], "email must be a valid address");
    }

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(rename = "name")]
        _name: String,
    }

    #[test]
    fn malformed_bodies_report_the_parser_error() {
        let err = parse_json_body::<Probe>(b"{not json").expect_err("invalid");
        assert!(err.message().starts_with("Invalid request body: "));
    }
}
