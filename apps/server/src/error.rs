//! # Action Error Type
//!
//! Unified error type for server actions.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in BizTrack                               │
//! │                                                                         │
//! │  Handler: Result<Json<ActionResponse<T>>, ActionError>                  │
//! │         │                                                               │
//! │         ├── Vec<ValidationError> ──► ValidationError + field list       │
//! │         ├── CoreError            ──► NotFound / BusinessRule / ...      │
//! │         ├── DbError              ──► NotFound / Conflict / DatabaseError│
//! │         ▼                                                               │
//! │  IntoResponse                                                           │
//! │     200 { "success": false, "error": "...", "errors": [...] }           │
//! │     401 { "success": false, "error": "Not signed in" }   (sessions)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal failures are logged here with their detail and reach the client
//! only as a generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use biztrack_core::{ActionResponse, CoreError, FieldError, ValidationError};
use biztrack_db::DbError;

/// Result type of every action handler.
pub type ActionResult<T> = Result<Json<ActionResponse<T>>, ActionError>;

/// Wraps data in a success envelope.
pub fn respond<T>(data: T) -> ActionResult<T> {
    Ok(Json(ActionResponse::ok(data)))
}

/// Error codes, used for logging and the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    /// Unique constraint, e.g. email already registered
    Conflict,
    /// Stock, overpayment, credentials, verification codes
    BusinessRule,
    /// Missing or invalid session (401)
    Unauthorized,
    DatabaseError,
    Internal,
}

/// An action failure, rendered as a `success: false` envelope.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ActionError {
    pub code: ErrorCode,
    pub message: String,
    pub errors: Vec<FieldError>,
}

impl ActionError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ActionError {
            code,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ActionError::new(ErrorCode::Unauthorized, message)
    }

    /// Logs `detail` and hides it behind a generic message.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(%detail, "Internal error");
        ActionError::new(ErrorCode::Internal, "Something went wrong, please try again")
    }

    pub fn status(&self) -> StatusCode {
        match self.code {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::OK,
        }
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        tracing::warn!(code = ?self.code, error = %self.message, "Action failed");

        let body = ActionResponse::<()> {
            success: false,
            data: None,
            error: Some(self.message.clone()),
            errors: self.errors.clone(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<Vec<ValidationError>> for ActionError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ActionError {
            code: ErrorCode::ValidationError,
            message: "Validation failed".to_string(),
            errors: errors.iter().map(FieldError::from).collect(),
        }
    }
}

impl From<CoreError> for ActionError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { .. } => ActionError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::EmailTaken(_) => ActionError::new(ErrorCode::Conflict, err.to_string()),
            CoreError::Validation(e) => ActionError::from(vec![e]),
            CoreError::InsufficientStock { .. }
            | CoreError::InvalidCredentials
            | CoreError::EmailNotVerified(_)
            | CoreError::InvalidCode
            | CoreError::CodeExpired
            | CoreError::Overpayment { .. }
            | CoreError::EmptySale
            | CoreError::AmountTooLarge => {
                ActionError::new(ErrorCode::BusinessRule, err.to_string())
            }
        }
    }
}

impl From<DbError> for ActionError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ActionError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { field, value } => ActionError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Foreign key violation");
                ActionError::new(
                    ErrorCode::Conflict,
                    "This record is referenced by other records",
                )
            }
            DbError::Rule(core) => ActionError::from(core),
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ActionError::new(ErrorCode::DatabaseError, "Database is busy, please try again")
            }
            other => {
                tracing::error!(error = %other, "Database operation failed");
                ActionError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Malformed JSON bodies become validation failures instead of axum's
/// plain-text 4xx.
impl From<JsonRejection> for ActionError {
    fn from(rejection: JsonRejection) -> Self {
        ActionError {
            code: ErrorCode::ValidationError,
            message: "Invalid request body".to_string(),
            errors: vec![FieldError {
                field: "body".to_string(),
                message: rejection.body_text(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_keep_fields() {
        let err = ActionError::from(vec![
            ValidationError::Required {
                field: "name".to_string(),
            },
            ValidationError::MustBePositive {
                field: "price_cents".to_string(),
            },
        ]);
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors[1].field, "price_cents");
    }

    #[test]
    fn test_rule_inside_db_error() {
        let err = ActionError::from(DbError::Rule(CoreError::EmptySale));
        assert_eq!(err.code, ErrorCode::BusinessRule);
        assert_eq!(err.message, "A sale needs at least one item");
    }

    #[test]
    fn test_internal_db_detail_is_hidden() {
        let err = ActionError::from(DbError::QueryFailed("near \"SELEC\": syntax error".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("SELEC"));
    }

    #[test]
    fn test_only_unauthorized_changes_status() {
        assert_eq!(ActionError::unauthorized("no").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ActionError::from(CoreError::InvalidCredentials).status(),
            StatusCode::OK
        );
    }
}
