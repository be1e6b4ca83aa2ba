//! # biztrack-db: Database Layer for BizTrack
//!
//! This crate provides database access for BizTrack. It uses SQLite with
//! sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BizTrack Data Flow                               │
//! │                                                                         │
//! │  Server action (POST /api/sales)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   biztrack-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ 001_initial  │  │   │
//! │  │   │               │    │ DebtRepo ...  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (DATABASE_PATH)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenant Scoping
//!
//! Every repository method on business-owned data takes the `business_id`
//! of the signed-in user and puts it in the `WHERE` clause. A row of another
//! business is indistinguishable from a missing row.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use biztrack_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./biztrack.db")).await?;
//! let products = db.products().list(&business_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::business::{BusinessRepository, NewOwner};
pub use repository::debt::DebtRepository;
pub use repository::delivery::DeliveryRepository;
pub use repository::employee::EmployeeRepository;
pub use repository::product::ProductRepository;
pub use repository::production::ProductionRepository;
pub use repository::sale::SaleRepository;
pub use repository::supplier::SupplierRepository;
pub use repository::user::UserRepository;
pub use repository::verification::VerificationRepository;
