//! # Action Inputs
//!
//! Request bodies accepted by the server actions.
//!
//! `New*` types create a row. `*Update` types carry only the fields the form
//! changed; `apply` copies them onto a loaded entity so the repository can
//! save the merged result.
//!
//! ```rust
//! use biztrack_core::inputs::SupplierUpdate;
//! # use biztrack_core::Supplier;
//! # use chrono::Utc;
//! # let mut supplier = Supplier {
//! #     id: "s1".into(), business_id: "b1".into(), name: "Old".into(),
//! #     contact_name: None, email: None, phone: None, address: None, notes: None,
//! #     created_at: Utc::now(), updated_at: Utc::now(),
//! # };
//! let update = SupplierUpdate { name: Some("Flour Mills Ltd".into()), ..Default::default() };
//! update.apply(&mut supplier);
//! assert_eq!(supplier.name, "Flour Mills Ltd");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::*;

fn default_unit() -> String {
    "pcs".to_string()
}

fn default_currency() -> String {
    "NGN".to_string()
}

// =============================================================================
// Auth
// =============================================================================

/// Creates a business together with its owner account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub business_name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResendOtpRequest {
    pub email: String,
    #[serde(default)]
    pub purpose: VerificationPurpose,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub price_cents: i64,
    #[serde(default)]
    pub cost_cents: i64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub price_cents: Option<i64>,
    pub cost_cents: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub is_active: Option<bool>,
}

impl ProductUpdate {
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if self.sku.is_some() {
            product.sku = self.sku;
        }
        if self.category.is_some() {
            product.category = self.category;
        }
        if self.description.is_some() {
            product.description = self.description;
        }
        if let Some(unit) = self.unit {
            product.unit = unit;
        }
        if let Some(price) = self.price_cents {
            product.price_cents = price;
        }
        if let Some(cost) = self.cost_cents {
            product.cost_cents = cost;
        }
        if let Some(threshold) = self.low_stock_threshold {
            product.low_stock_threshold = threshold;
        }
        if let Some(active) = self.is_active {
            product.is_active = active;
        }
    }
}

/// Manual stock correction: positive adds, negative removes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAdjustment {
    pub delta: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSaleItem {
    pub product_id: String,
    pub quantity: i64,
    /// Overrides the product's current price for this line.
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
}

/// Records a sale. Anything not paid up front becomes a debt.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// `None` means paid in full.
    #[serde(default)]
    pub amount_paid_cents: Option<i64>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<NewSaleItem>,
}

// =============================================================================
// Debts
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDebt {
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub sale_id: Option<String>,
    pub amount_cents: i64,
    #[serde(default)]
    pub amount_paid_cents: i64,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DebtUpdate {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub amount_cents: Option<i64>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl DebtUpdate {
    /// Applies the changes and re-derives the status from the amounts.
    pub fn apply(self, debt: &mut Debt) {
        if let Some(name) = self.customer_name {
            debt.customer_name = name;
        }
        if self.customer_phone.is_some() {
            debt.customer_phone = self.customer_phone;
        }
        if let Some(amount) = self.amount_cents {
            debt.amount_cents = amount;
        }
        if self.due_date.is_some() {
            debt.due_date = self.due_date;
        }
        if self.notes.is_some() {
            debt.notes = self.notes;
        }
        debt.status = DebtStatus::from_amounts(debt.amount_cents, debt.amount_paid_cents);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDebtPayment {
    pub amount_cents: i64,
    #[serde(default)]
    pub method: PaymentMethod,
    #[serde(default)]
    pub note: Option<String>,
}

// =============================================================================
// Deliveries, Production, Suppliers
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDelivery {
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: DeliveryStatus,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryUpdate {
    pub supplier_id: Option<String>,
    pub customer_name: Option<String>,
    pub address: Option<String>,
    pub status: Option<DeliveryStatus>,
    #[ts(as = "Option<String>")]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl DeliveryUpdate {
    /// Applies the changes. Moving to `Delivered` stamps `delivered_at`.
    pub fn apply(self, delivery: &mut Delivery, now: DateTime<Utc>) {
        if self.supplier_id.is_some() {
            delivery.supplier_id = self.supplier_id;
        }
        if self.customer_name.is_some() {
            delivery.customer_name = self.customer_name;
        }
        if self.address.is_some() {
            delivery.address = self.address;
        }
        if self.scheduled_at.is_some() {
            delivery.scheduled_at = self.scheduled_at;
        }
        if self.notes.is_some() {
            delivery.notes = self.notes;
        }
        if let Some(status) = self.status {
            if status == DeliveryStatus::Delivered && delivery.delivered_at.is_none() {
                delivery.delivered_at = Some(now);
            }
            delivery.status = status;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduction {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub cost_cents: i64,
    #[serde(default)]
    pub status: ProductionStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductionUpdate {
    pub quantity: Option<i64>,
    pub cost_cents: Option<i64>,
    pub status: Option<ProductionStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierUpdate {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl SupplierUpdate {
    pub fn apply(self, supplier: &mut Supplier) {
        if let Some(name) = self.name {
            supplier.name = name;
        }
        if self.contact_name.is_some() {
            supplier.contact_name = self.contact_name;
        }
        if self.email.is_some() {
            supplier.email = self.email;
        }
        if self.phone.is_some() {
            supplier.phone = self.phone;
        }
        if self.address.is_some() {
            supplier.address = self.address;
        }
        if self.notes.is_some() {
            supplier.notes = self.notes;
        }
    }
}

// =============================================================================
// Employees
// =============================================================================

/// Adds an employee and mails them an invitation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub salary_cents: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub position: Option<String>,
    pub salary_cents: Option<i64>,
    pub status: Option<EmployeeStatus>,
}

impl EmployeeUpdate {
    pub fn apply(self, employee: &mut Employee) {
        if let Some(name) = self.name {
            employee.name = name;
        }
        if self.phone.is_some() {
            employee.phone = self.phone;
        }
        if let Some(role) = self.role {
            employee.role = role;
        }
        if self.position.is_some() {
            employee.position = self.position;
        }
        if let Some(salary) = self.salary_cents {
            employee.salary_cents = salary;
        }
        if let Some(status) = self.status {
            employee.status = status;
        }
    }
}
