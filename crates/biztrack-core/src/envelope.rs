//! # Action Envelope
//!
//! Every server action answers with the same JSON shape:
//!
//! ```text
//! success:  { "success": true,  "data": { ... } }
//! failure:  { "success": false, "error": "Product not found: abc" }
//! invalid:  { "success": false, "error": "Validation failed",
//!             "errors": [ { "field": "email", "message": "..." } ] }
//! ```
//!
//! The client never looks at HTTP status codes for action outcomes; it reads
//! `success` and then either `data` or `error`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(err: &ValidationError) -> Self {
        FieldError {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// The `{success, data, error}` wrapper returned by every action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ActionResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl<T> ActionResponse<T> {
    pub fn ok(data: T) -> Self {
        ActionResponse {
            success: true,
            data: Some(data),
            error: None,
            errors: Vec::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        ActionResponse {
            success: false,
            data: None,
            error: Some(message.into()),
            errors: Vec::new(),
        }
    }

    /// A failure carrying per-field validation errors.
    pub fn invalid(errors: &[ValidationError]) -> Self {
        ActionResponse {
            success: false,
            data: None,
            error: Some("Validation failed".to_string()),
            errors: errors.iter().map(FieldError::from).collect(),
        }
    }

    /// Converts the envelope back into a `Result`, for callers that
    /// prefer `?` over checking `success`.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self
                .error
                .unwrap_or_else(|| "Request failed".to_string()))
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for ActionResponse<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => ActionResponse::ok(data),
            Err(e) => ActionResponse::fail(e.to_string()),
        }
    }
}
