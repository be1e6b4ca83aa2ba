//! # Validation Module
//!
//! Input validation for BizTrack actions.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web forms                                                    │
//! │  └── Immediate feedback on empty fields                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Server action (Rust)                                         │
//! │  ├── Type validation (serde deserialization)                           │
//! │  └── THIS MODULE: field rules, collected into `errors[]`               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (email, sku per business)                                  │
//! │  └── Foreign keys (tenant scoping)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Single-field validators return the first problem they find. The
//! [`Validate`] trait runs every validator for an input and returns all
//! failures at once, so a form can mark each bad field.
//!
//! ## Usage
//! ```rust
//! use biztrack_core::inputs::LoginRequest;
//! use biztrack_core::validation::Validate;
//!
//! let input = LoginRequest { email: "nope".into(), password: "".into() };
//! let errors = input.validate().unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```

use crate::error::ValidationError;
use crate::inputs::*;
use crate::{MAX_AMOUNT_CENTS, MAX_ITEM_QUANTITY, MAX_SALE_ITEMS, VERIFICATION_CODE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_NOTES_LENGTH: usize = 2000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field (names, titles).
///
/// ```rust
/// use biztrack_core::validation::validate_name;
///
/// assert!(validate_name("name", "Mama Put Kitchen").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates an optional notes field.
pub fn validate_notes(field: &str, value: Option<&str>) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > MAX_NOTES_LENGTH => Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NOTES_LENGTH,
        }),
        _ => Ok(()),
    }
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@`, with something on both sides
/// - The domain contains a dot that is neither first nor last
/// - No whitespace
///
/// ```rust
/// use biztrack_core::validation::validate_email;
///
/// assert!(validate_email("owner@shop.ng").is_ok());
/// assert!(validate_email("owner@shop").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    match domain.rfind('.') {
        Some(dot) if dot > 0 && dot < domain.len() - 1 => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a new password.
pub fn validate_password(field: &str, password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Validates a verification code as typed by the user.
///
/// Codes are case-insensitive on input; see [`crate::codes::normalize_code`].
///
/// ```rust
/// use biztrack_core::validation::validate_code;
///
/// assert!(validate_code("A1B2C3").is_ok());
/// assert!(validate_code("a1b2c3").is_ok());
/// assert!(validate_code("A1B2").is_err());
/// assert!(validate_code("A1B2C!").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() != VERIFICATION_CODE_LENGTH || !code.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: format!("must be {} letters or digits", VERIFICATION_CODE_LENGTH),
        });
    }

    Ok(())
}

/// Validates a SKU, when one is given.
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity on a sale line or production run.
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Zero is allowed (free items, nothing paid yet).
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a price or money amount in cents: `0..=MAX_AMOUNT_CENTS`.
pub fn validate_amount(field: &str, cents: i64) -> ValidationResult<()> {
    validate_non_negative(field, cents)?;
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Like [`validate_amount`], but zero is rejected.
pub fn validate_positive_amount(field: &str, cents: i64) -> ValidationResult<()> {
    validate_positive(field, cents)?;
    validate_amount(field, cents)
}

/// A manual stock correction: non-zero, at most `MAX_ITEM_QUANTITY` either way.
pub fn validate_stock_delta(field: &str, delta: i64) -> ValidationResult<()> {
    if delta == 0 {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not be zero".to_string(),
        });
    }
    if !(-MAX_ITEM_QUANTITY..=MAX_ITEM_QUANTITY).contains(&delta) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: -MAX_ITEM_QUANTITY,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

pub fn validate_positive(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a UUID string.
///
/// ```rust
/// use biztrack_core::validation::validate_uuid;
///
/// assert!(validate_uuid("product_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("product_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Input Validation
// =============================================================================

/// Runs every rule for an action input and reports all failures.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<ValidationError>>;
}

/// Accumulates validator failures.
#[derive(Debug, Default)]
struct Checks(Vec<ValidationError>);

impl Checks {
    fn check(&mut self, result: ValidationResult<()>) -> &mut Self {
        if let Err(e) = result {
            self.0.push(e);
        }
        self
    }

    fn check_opt<T>(&mut self, value: Option<T>, f: impl FnOnce(T) -> ValidationResult<()>) -> &mut Self {
        if let Some(v) = value {
            self.check(f(v));
        }
        self
    }

    fn finish(&mut self) -> Result<(), Vec<ValidationError>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.0))
        }
    }
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check(validate_name("name", &self.name))
            .check(validate_email(&self.email))
            .check(validate_password("password", &self.password))
            .check(validate_name("business_name", &self.business_name))
            .finish()
    }
}

impl Validate for VerifyOtpRequest {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check(validate_email(&self.email))
            .check(validate_code(&self.code))
            .finish()
    }
}

impl Validate for ResendOtpRequest {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default().check(validate_email(&self.email)).finish()
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let password = if self.password.is_empty() {
            Err(ValidationError::Required {
                field: "password".to_string(),
            })
        } else {
            Ok(())
        };

        Checks::default()
            .check(validate_email(&self.email))
            .check(password)
            .finish()
    }
}

impl Validate for ForgotPasswordRequest {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default().check(validate_email(&self.email)).finish()
    }
}

impl Validate for ResetPasswordRequest {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check(validate_email(&self.email))
            .check(validate_code(&self.code))
            .check(validate_password("new_password", &self.new_password))
            .finish()
    }
}

impl Validate for NewProduct {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check(validate_name("name", &self.name))
            .check_opt(self.sku.as_deref(), validate_sku)
            .check(validate_name("unit", &self.unit))
            .check(validate_amount("price_cents", self.price_cents))
            .check(validate_amount("cost_cents", self.cost_cents))
            .check(validate_non_negative("quantity", self.quantity))
            .check_opt(self.low_stock_threshold, |t| {
                validate_non_negative("low_stock_threshold", t)
            })
            .check(validate_notes("description", self.description.as_deref()))
            .finish()
    }
}

impl Validate for ProductUpdate {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check_opt(self.name.as_deref(), |n| validate_name("name", n))
            .check_opt(self.sku.as_deref(), validate_sku)
            .check_opt(self.unit.as_deref(), |u| validate_name("unit", u))
            .check_opt(self.price_cents, |p| validate_amount("price_cents", p))
            .check_opt(self.cost_cents, |c| validate_amount("cost_cents", c))
            .check_opt(self.low_stock_threshold, |t| {
                validate_non_negative("low_stock_threshold", t)
            })
            .check(validate_notes("description", self.description.as_deref()))
            .finish()
    }
}

impl Validate for StockAdjustment {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check(validate_stock_delta("delta", self.delta))
            .finish()
    }
}

impl Validate for NewSale {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut checks = Checks::default();

        if self.items.is_empty() {
            checks.check(Err(ValidationError::Required {
                field: "items".to_string(),
            }));
        } else if self.items.len() > MAX_SALE_ITEMS {
            checks.check(Err(ValidationError::OutOfRange {
                field: "items".to_string(),
                min: 1,
                max: MAX_SALE_ITEMS as i64,
            }));
        }

        for (i, item) in self.items.iter().enumerate() {
            checks
                .check(validate_uuid(&format!("items[{}].product_id", i), &item.product_id))
                .check(validate_quantity(&format!("items[{}].quantity", i), item.quantity))
                .check_opt(item.unit_price_cents, |p| {
                    validate_amount(&format!("items[{}].unit_price_cents", i), p)
                });
        }

        checks
            .check_opt(self.amount_paid_cents, |p| validate_amount("amount_paid_cents", p))
            .check_opt(self.customer_name.as_deref(), |n| {
                validate_name("customer_name", n)
            })
            .check(validate_notes("notes", self.notes.as_deref()))
            .finish()
    }
}

impl Validate for NewDebt {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let overpaid = if self.amount_paid_cents > self.amount_cents {
            Err(ValidationError::OutOfRange {
                field: "amount_paid_cents".to_string(),
                min: 0,
                max: self.amount_cents,
            })
        } else {
            Ok(())
        };

        Checks::default()
            .check(validate_name("customer_name", &self.customer_name))
            .check(validate_positive_amount("amount_cents", self.amount_cents))
            .check(validate_amount("amount_paid_cents", self.amount_paid_cents))
            .check(overpaid)
            .check_opt(self.sale_id.as_deref(), |id| validate_uuid("sale_id", id))
            .check(validate_notes("notes", self.notes.as_deref()))
            .finish()
    }
}

impl Validate for DebtUpdate {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check_opt(self.customer_name.as_deref(), |n| {
                validate_name("customer_name", n)
            })
            .check_opt(self.amount_cents, |a| validate_positive_amount("amount_cents", a))
            .check(validate_notes("notes", self.notes.as_deref()))
            .finish()
    }
}

impl Validate for NewDebtPayment {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check(validate_positive_amount("amount_cents", self.amount_cents))
            .check(validate_notes("note", self.note.as_deref()))
            .finish()
    }
}

impl Validate for NewDelivery {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let target = if self.supplier_id.is_none() && self.customer_name.is_none() {
            Err(ValidationError::Required {
                field: "customer_name".to_string(),
            })
        } else {
            Ok(())
        };

        Checks::default()
            .check(target)
            .check_opt(self.supplier_id.as_deref(), |id| {
                validate_uuid("supplier_id", id)
            })
            .check(validate_notes("notes", self.notes.as_deref()))
            .finish()
    }
}

impl Validate for DeliveryUpdate {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check_opt(self.supplier_id.as_deref(), |id| {
                validate_uuid("supplier_id", id)
            })
            .check(validate_notes("notes", self.notes.as_deref()))
            .finish()
    }
}

impl Validate for NewProduction {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check(validate_uuid("product_id", &self.product_id))
            .check(validate_quantity("quantity", self.quantity))
            .check(validate_amount("cost_cents", self.cost_cents))
            .check(validate_notes("notes", self.notes.as_deref()))
            .finish()
    }
}

impl Validate for ProductionUpdate {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check_opt(self.quantity, |q| validate_quantity("quantity", q))
            .check_opt(self.cost_cents, |c| validate_amount("cost_cents", c))
            .check(validate_notes("notes", self.notes.as_deref()))
            .finish()
    }
}

impl Validate for NewSupplier {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check(validate_name("name", &self.name))
            .check_opt(self.email.as_deref(), validate_email)
            .check(validate_notes("notes", self.notes.as_deref()))
            .finish()
    }
}

impl Validate for SupplierUpdate {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check_opt(self.name.as_deref(), |n| validate_name("name", n))
            .check_opt(self.email.as_deref(), validate_email)
            .check(validate_notes("notes", self.notes.as_deref()))
            .finish()
    }
}

impl Validate for NewEmployee {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check(validate_name("name", &self.name))
            .check(validate_email(&self.email))
            .check(validate_amount("salary_cents", self.salary_cents))
            .finish()
    }
}

impl Validate for EmployeeUpdate {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Checks::default()
            .check_opt(self.name.as_deref(), |n| validate_name("name", n))
            .check_opt(self.salary_cents, |s| validate_amount("salary_cents", s))
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("  owner@shop.ng ").is_ok());

        assert!(validate_email("a@b").is_err());
        assert!(validate_email("@b.co").is_err());
        assert!(validate_email("a@@b.co").is_err());
        assert!(validate_email("a b@c.co").is_err());
        assert!(validate_email("a@b.").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password", "longenough").is_ok());
        assert_eq!(
            validate_password("password", "short"),
            Err(ValidationError::TooShort {
                field: "password".to_string(),
                min: MIN_PASSWORD_LENGTH
            })
        );
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("quantity", 1).is_ok());
        assert!(validate_quantity("quantity", MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity("quantity", 0).is_err());
        assert!(validate_quantity("quantity", MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("price_cents", 0).is_ok());
        assert!(validate_amount("price_cents", MAX_AMOUNT_CENTS).is_ok());
        assert!(validate_amount("price_cents", -1).is_err());
        assert_eq!(
            validate_amount("price_cents", MAX_AMOUNT_CENTS + 1),
            Err(ValidationError::OutOfRange {
                field: "price_cents".to_string(),
                min: 0,
                max: MAX_AMOUNT_CENTS,
            })
        );
        assert!(validate_positive_amount("amount_cents", 0).is_err());
    }

    #[test]
    fn test_largest_valid_sale_total_fits() {
        let largest = MAX_AMOUNT_CENTS
            .checked_mul(MAX_ITEM_QUANTITY)
            .and_then(|line| line.checked_mul(MAX_SALE_ITEMS as i64));
        assert!(largest.is_some());
    }

    #[test]
    fn test_sale_line_price_is_bounded() {
        let input = NewSale {
            customer_name: None,
            customer_phone: None,
            payment_method: PaymentMethod::Cash,
            amount_paid_cents: None,
            due_date: None,
            notes: None,
            items: vec![NewSaleItem {
                product_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
                quantity: 10,
                unit_price_cents: Some(i64::MAX / 2),
            }],
        };

        let errors = input.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(), "items[0].unit_price_cents");
    }

    #[test]
    fn test_stock_delta_is_bounded() {
        assert!(StockAdjustment { delta: -5, reason: None }.validate().is_ok());
        assert!(StockAdjustment { delta: 0, reason: None }.validate().is_err());

        let errors = StockAdjustment { delta: i64::MIN, reason: None }
            .validate()
            .unwrap_err();
        assert_eq!(errors[0].field(), "delta");
        assert!(StockAdjustment { delta: MAX_ITEM_QUANTITY + 1, reason: None }
            .validate()
            .is_err());
    }

    #[test]
    fn test_signup_collects_every_error() {
        let input = SignupRequest {
            name: "".to_string(),
            email: "bad".to_string(),
            password: "123".to_string(),
            business_name: "Shop".to_string(),
            currency: "NGN".to_string(),
        };

        let errors = input.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["name", "email", "password"]);
    }

    #[test]
    fn test_sale_item_errors_name_the_line() {
        let input = NewSale {
            customer_name: None,
            customer_phone: None,
            payment_method: PaymentMethod::Cash,
            amount_paid_cents: None,
            due_date: None,
            notes: None,
            items: vec![NewSaleItem {
                product_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
                quantity: 0,
                unit_price_cents: None,
            }],
        };

        let errors = input.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(), "items[0].quantity");
    }

    #[test]
    fn test_empty_sale_is_rejected() {
        let input = NewSale {
            customer_name: None,
            customer_phone: None,
            payment_method: PaymentMethod::Cash,
            amount_paid_cents: None,
            due_date: None,
            notes: None,
            items: vec![],
        };

        let errors = input.validate().unwrap_err();
        assert_eq!(errors[0].field(), "items");
    }

    #[test]
    fn test_new_debt_rejects_overpayment() {
        let input = NewDebt {
            customer_name: "Ada".to_string(),
            customer_phone: None,
            sale_id: None,
            amount_cents: 1000,
            amount_paid_cents: 1500,
            due_date: None,
            notes: None,
        };

        let errors = input.validate().unwrap_err();
        assert_eq!(errors[0].field(), "amount_paid_cents");
    }

    #[test]
    fn test_partial_updates_only_check_given_fields() {
        assert!(ProductUpdate::default().validate().is_ok());
        assert!(ProductUpdate {
            price_cents: Some(-1),
            ..Default::default()
        }
        .validate()
        .is_err());
    }
}
