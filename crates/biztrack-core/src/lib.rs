//! # biztrack-core: Pure Domain Logic for BizTrack
//!
//! This crate holds everything in BizTrack that can be expressed without I/O:
//! entity types, money, validation, the action envelope, the in-memory entity
//! stores that mirror server rows, and the auth overlay step flow.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BizTrack Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  biztrack-client (browser-side state)           │   │
//! │  │    EntityStores ◄── AuthFlow ◄── Dashboard hook                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (JSON envelopes)                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  │    /api/products, /api/sales, /api/auth/*, /api/proxy           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ biztrack-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │ envelope │ │  store  │ │  auth  │  │   │
//! │  │   │ Product │ │  Money  │ │ Action-  │ │ Entity- │ │  flow  │  │   │
//! │  │   │  Sale   │ │         │ │ Response │ │ Store   │ │        │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   biztrack-db (Database Layer)                  │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Product, Sale, Debt, Delivery, ...) and statuses
//! - [`inputs`] - Request bodies for create/update actions
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation for action inputs
//! - [`envelope`] - The `{success, data, error}` wrapper every action returns
//! - [`store`] - In-memory entity stores
//! - [`auth_flow`] - Signup / login / OTP overlay state machine
//! - [`codes`] - Verification code generation
//!
//! ## Example Usage
//!
//! ```rust
//! use biztrack_core::auth_flow::{AuthFlow, AuthStep};
//!
//! let mut flow = AuthFlow::new();
//! flow.open_auth(AuthStep::Signup, Some("/dashboard/sales".to_string()));
//! flow.next_step(); // signup -> otp
//! flow.next_step(); // otp -> complete
//!
//! let nav = flow.next_step().expect("finishing the flow navigates");
//! assert_eq!(nav.path, "/dashboard/sales");
//! assert!(!flow.is_open());
//! ```

pub mod auth_flow;
pub mod codes;
pub mod envelope;
pub mod error;
pub mod inputs;
pub mod money;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use auth_flow::{AuthFlow, AuthStep, Navigation};
pub use envelope::{ActionResponse, FieldError};
pub use error::{CoreError, CoreResult, ValidationError};
pub use inputs::*;
pub use money::Money;
pub use store::{Entity, EntityStore};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Where a finished auth flow navigates when no redirect was recorded.
pub const DEFAULT_REDIRECT_PATH: &str = "/dashboard";

/// Length of email verification and password reset codes.
pub const VERIFICATION_CODE_LENGTH: usize = 6;

/// Stock level at or below which a product counts as low stock,
/// unless the product carries its own threshold.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Maximum line items in a single sale.
pub const MAX_SALE_ITEMS: usize = 100;

/// Maximum quantity of a single sale line.
pub const MAX_ITEM_QUANTITY: i64 = 10_000;

/// Largest price or money amount accepted on input, in cents
/// (ten billion in major units). A full sale of `MAX_SALE_ITEMS` lines at
/// `MAX_ITEM_QUANTITY` each still fits in an `i64` total.
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000;
