//! # Domain Types
//!
//! Entities shared by the server, the database layer and the client stores.
//!
//! ## Entity Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Business (tenant)                              │
//! │                                                                         │
//! │   User ── Employee        Supplier ── Delivery                         │
//! │                                                                         │
//! │   Product ◄── SaleItem ──► Sale ──► Debt ──► DebtPayment               │
//! │      ▲                                                                  │
//! │      └────── Production                                                 │
//! │                                                                         │
//! │  Every row carries `business_id`; the database is the only place       │
//! │  that enforces uniqueness and tenant scoping.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Denormalized Relations
//! A few entities embed related rows the way the UI consumes them:
//! `SaleItem::product`, `Sale::items`, `Debt::payments`. These are filled by
//! the repositories after the main query and are never columns themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::DEFAULT_LOW_STOCK_THRESHOLD;

// =============================================================================
// Roles & Statuses
// =============================================================================

/// Role of a user or employee inside a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Created the business at signup.
    Owner,
    Manager,
    #[default]
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }
}

/// Lifecycle of an employee record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Invitation email sent, not yet accepted.
    #[default]
    Invited,
    Active,
    Inactive,
}

/// How a sale or a debt repayment was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Transfer,
    /// Sold on credit: the unpaid part becomes a debt.
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    #[default]
    Completed,
    Cancelled,
}

/// Repayment state of a debt, derived from amount and amount paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    #[default]
    Pending,
    Partial,
    Paid,
}

impl DebtStatus {
    /// Derives the status from what is owed and what has been paid.
    ///
    /// ```rust
    /// use biztrack_core::DebtStatus;
    ///
    /// assert_eq!(DebtStatus::from_amounts(1000, 0), DebtStatus::Pending);
    /// assert_eq!(DebtStatus::from_amounts(1000, 400), DebtStatus::Partial);
    /// assert_eq!(DebtStatus::from_amounts(1000, 1000), DebtStatus::Paid);
    /// ```
    pub fn from_amounts(amount_cents: i64, amount_paid_cents: i64) -> Self {
        if amount_paid_cents >= amount_cents {
            DebtStatus::Paid
        } else if amount_paid_cents > 0 {
            DebtStatus::Partial
        } else {
            DebtStatus::Pending
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    InTransit,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    /// Pending and in-transit deliveries still need attention.
    pub fn is_open(&self) -> bool {
        matches!(self, DeliveryStatus::Pending | DeliveryStatus::InTransit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStatus {
    #[default]
    Planned,
    InProgress,
    /// Produced quantity has been added to stock.
    Completed,
}

/// What a verification code was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPurpose {
    #[default]
    Signup,
    PasswordReset,
}

// =============================================================================
// Business & Users
// =============================================================================

/// The tenant. Every other entity belongs to exactly one business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Business {
    pub id: String,
    pub name: String,
    /// Owning user; unset only between the two inserts of signup.
    pub owner_id: Option<String>,
    /// ISO 4217 code, display only.
    pub currency: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A login account. Never serialized to clients; see [`UserProfile`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a [`User`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserProfile {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub email_verified: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id.clone(),
            business_id: user.business_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            email_verified: user.email_verified,
        }
    }
}

/// What a successful login or OTP confirmation hands back to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
    pub business: Business,
}

/// `GET /api/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CurrentUser {
    pub user: UserProfile,
    pub business: Business,
}

/// Acknowledges that a verification code went out. The code itself is
/// only ever in the email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CodeSent {
    pub email: String,
    pub purpose: VerificationPurpose,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Employee {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub position: Option<String>,
    pub salary_cents: i64,
    pub status: EmployeeStatus,
    #[ts(as = "Option<String>")]
    pub invited_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A one-time code mailed for signup confirmation or password reset.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VerificationCode {
    pub id: String,
    pub email: String,
    pub code: String,
    pub purpose: VerificationPurpose,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Unit of measure shown next to quantities ("pcs", "kg", "bag").
    pub unit: String,
    pub price_cents: i64,
    pub cost_cents: i64,
    /// Units currently in stock.
    pub quantity: i64,
    pub low_stock_threshold: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Stock at or below the product's threshold.
    pub fn is_low_stock(&self) -> bool {
        let threshold = if self.low_stock_threshold > 0 {
            self.low_stock_threshold
        } else {
            DEFAULT_LOW_STOCK_THRESHOLD
        };
        self.quantity <= threshold
    }

    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && self.quantity >= quantity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A production run that turns into stock of one product once completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Production {
    pub id: String,
    pub business_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub cost_cents: i64,
    pub status: ProductionStatus,
    pub notes: Option<String>,
    #[ts(as = "Option<String>")]
    pub produced_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Delivery {
    pub id: String,
    pub business_id: String,
    pub supplier_id: Option<String>,
    pub customer_name: Option<String>,
    pub address: Option<String>,
    pub status: DeliveryStatus,
    #[ts(as = "Option<String>")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub delivered_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub business_id: String,
    pub customer_name: Option<String>,
    pub status: SaleStatus,
    pub payment_method: PaymentMethod,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub notes: Option<String>,
    /// User who recorded the sale.
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<SaleItem>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// What the customer still owes on this sale.
    pub fn balance_due(&self) -> Money {
        self.total()
            .remaining_after(Money::from_cents(self.amount_paid_cents))
    }
}

/// A line of a sale. Price is frozen at the time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub product: Option<Product>,
}

// =============================================================================
// Debts
// =============================================================================

/// Money a customer owes, either from a credit sale or recorded by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Debt {
    pub id: String,
    pub business_id: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub sale_id: Option<String>,
    pub amount_cents: i64,
    pub amount_paid_cents: i64,
    pub status: DebtStatus,
    #[ts(as = "Option<String>")]
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub payments: Vec<DebtPayment>,
}

impl Debt {
    pub fn outstanding(&self) -> Money {
        Money::from_cents(self.amount_cents)
            .remaining_after(Money::from_cents(self.amount_paid_cents))
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != DebtStatus::Paid && self.due_date.is_some_and(|due| due < now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DebtPayment {
    pub id: String,
    pub debt_id: String,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// What `POST /api/sales` hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecordedSale {
    pub sale: Sale,
    /// Present when part of the total was left unpaid.
    pub debt: Option<Debt>,
}
