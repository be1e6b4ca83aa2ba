//! # Error Types
//!
//! Domain-specific error types for biztrack-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  biztrack-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  biztrack-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  server errors (apps/server)                                           │
//! │  └── ActionError      - Folded into the {success:false} envelope       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ActionError → envelope → client   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations and domain failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity does not exist (or belongs to another business).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Selling more than is in stock.
    ///
    /// ## User Workflow
    /// ```text
    /// New sale: 5 × "Bread"
    ///      │
    ///      ▼
    /// Stock check: quantity = 3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Bread", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Envelope: { success: false, error: "Insufficient stock for Bread: ..." }
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Email/password pair does not match.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Login attempted before the signup code was confirmed.
    #[error("Email {0} has not been verified")]
    EmailNotVerified(String),

    /// Signup with an email that already has an account.
    #[error("An account with email {0} already exists")]
    EmailTaken(String),

    /// Verification code does not match any outstanding code.
    #[error("Invalid verification code")]
    InvalidCode,

    /// Verification code matched but its lifetime is over.
    #[error("Verification code has expired")]
    CodeExpired,

    /// Debt payment larger than what is still owed.
    #[error("Payment of {attempted_cents} exceeds outstanding balance of {outstanding_cents}")]
    Overpayment {
        outstanding_cents: i64,
        attempted_cents: i64,
    },

    /// Sale submitted without line items.
    #[error("A sale needs at least one item")]
    EmptySale,

    /// A computed amount does not fit in the money type.
    #[error("Amount is too large")]
    AmountTooLarge,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Every variant names the offending field so the envelope can carry a
/// per-field error list back to the form that submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid email, invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Name of the field this error is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Bread".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Bread: available 3, requested 5"
        );

        let err = CoreError::not_found("Product", "abc");
        assert_eq!(err.to_string(), "Product not found: abc");
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        };
        assert_eq!(err.field(), "password");
        assert_eq!(err.to_string(), "password must be at least 8 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
