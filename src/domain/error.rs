//! Error taxonomy shared by every layer.
//!
//! Gateways translate storage outcomes into an [`AppError`] exactly once;
//! services pass them through untouched; the HTTP layer turns them into
//! `{code, message, details}` bodies with the status fixed by [`ErrorKind`].

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;

/// Boxed underlying cause kept for logging only.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Closed set of failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed or unvalidated request
    InvalidInput,
    /// No matching entity
    ResourceNotFound,
    /// Uniqueness violation
    DuplicateResource,
    /// Storage-layer failure
    Database,
    /// Unexpected failure
    Internal,
    /// Reserved, unused by current routes
    Unauthorized,
    /// Reserved, unused by current routes
    Forbidden,
}

impl ErrorKind {
    /// HTTP status code bound to this kind.
    #[must_use]
    pub fn status(self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::ResourceNotFound => 404,
            Self::DuplicateResource => 409,
            Self::Database | Self::Internal => 500,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
        }
    }

    /// Machine-readable code emitted on the wire.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::DuplicateResource => "DUPLICATE_RESOURCE",
            Self::Database => "DATABASE_ERROR",
            Self::Internal => "INTERNAL_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Application error carrying a kind, a client-safe message, optional
/// structured details, and an optional wrapped cause.
///
/// The cause is never serialized. It is reachable through
/// [`std::error::Error::source`] so the HTTP layer can log the full chain.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    details: Option<Map<String, Value>>,
    #[source]
    source: Option<BoxError>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResourceNotFound, message)
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateResource, message)
    }

    /// Storage failure wrapping the driver error.
    pub fn database(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::Database, message).with_source(source)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Attach a single structured detail.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace the details map wholesale.
    #[must_use]
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn details(&self) -> Option<&Map<String, Value>> {
        self.details.as_ref()
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::ResourceNotFound
    }

    /// Client-facing body for this error.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.kind.code().to_string(),
            message: self.message.clone(),
            details: self.details.clone(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details = Map::new();
        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<Value> = field_errors
                .iter()
                .map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| e.code.to_string());
                    Value::String(message)
                })
                .collect();
            details.insert(field.to_string(), Value::Array(messages));
        }
        Self::invalid_input("Invalid input").with_details(details)
    }
}

/// Wire shape of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    #[schema(example = "RESOURCE_NOT_FOUND")]
    pub code: String,
    /// Human-readable error message
    #[schema(example = "User not found")]
    pub message: String,
    /// Optional structured details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Map<String, Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use validator::Validate;

    #[test]
    fn test_kind_status_and_code_table() {
        let table = [
            (ErrorKind::InvalidInput, 400, "INVALID_INPUT"),
            (ErrorKind::ResourceNotFound, 404, "RESOURCE_NOT_FOUND"),
            (ErrorKind::DuplicateResource, 409, "DUPLICATE_RESOURCE"),
            (ErrorKind::Database, 500, "DATABASE_ERROR"),
            (ErrorKind::Internal, 500, "INTERNAL_ERROR"),
            (ErrorKind::Unauthorized, 401, "UNAUTHORIZED"),
            (ErrorKind::Forbidden, 403, "FORBIDDEN"),
        ];

        for (kind, status, code) in table {
            assert_eq!(kind.status(), status);
            assert_eq!(kind.code(), code);
            assert_eq!(kind.to_string(), code);
        }
    }

    #[test]
    fn test_response_never_contains_source() {
        let cause = io::Error::other("connection reset by peer: SELECT * FROM users");
        let err = AppError::database("Failed to retrieve users", cause);

        assert!(err.source().is_some());
        let body = serde_json::to_string(&err.to_response()).unwrap();
        assert!(!body.contains("connection reset"));
        assert!(!body.contains("SELECT"));
        assert!(body.contains("DATABASE_ERROR"));
    }

    #[test]
    fn test_details_are_accumulated() {
        let err = AppError::not_found("User not found")
            .with_detail("id", 7)
            .with_detail("scope", "users");

        let details = err.details().unwrap();
        assert_eq!(details.get("id"), Some(&Value::from(7)));
        assert_eq!(details.get("scope"), Some(&Value::from("users")));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_details_omitted_when_absent() {
        let body = serde_json::to_value(AppError::internal("boom").to_response()).unwrap();
        assert!(body.get("details").is_none());
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert_eq!(body["message"], "boom");
    }

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
    }

    #[test]
    fn test_validation_errors_become_invalid_input() {
        let probe = Probe {
            name: "ab".to_string(),
        };
        let err: AppError = probe.validate().unwrap_err().into();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let details = err.details().unwrap();
        assert_eq!(details["name"], serde_json::json!(["too short"]));
    }
}
