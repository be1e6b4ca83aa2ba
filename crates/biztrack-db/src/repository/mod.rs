//! # Repository Module
//!
//! One repository per resource. Each wraps a clone of the pool and exposes
//! the handful of queries the server actions need.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Server action                                                          │
//! │       │                                                                 │
//! │       │  db.products().list(&session.business_id)                      │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list(business_id)                                                 │
//! │  ├── get(business_id, id)                                              │
//! │  ├── create(business_id, input)                                        │
//! │  ├── save(&product)                                                    │
//! │  └── delete(business_id, id)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite  (WHERE business_id = ?)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `get` returns [`DbError::NotFound`](crate::DbError::NotFound) rather than
//! `Option`, because every caller turns a missing row into the same
//! "not found" envelope.

pub mod business;
pub mod debt;
pub mod delivery;
pub mod employee;
pub mod product;
pub mod production;
pub mod sale;
pub mod supplier;
pub mod user;
pub mod verification;

use sqlx::sqlite::SqliteQueryResult;

use crate::error::{DbError, DbResult};

/// Turns "zero rows touched" into a NotFound for the given entity.
pub(crate) fn expect_one(
    result: SqliteQueryResult,
    entity: &str,
    id: &str,
) -> DbResult<()> {
    if result.rows_affected() == 0 {
        Err(DbError::not_found(entity, id))
    } else {
        Ok(())
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use biztrack_core::{Business, NewProduct, Product, User};

    use super::business::NewOwner;
    use crate::{Database, DbConfig};

    /// A migrated in-memory database with one registered business.
    pub async fn setup() -> (Database, Business, User) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (business, owner) = register(&db, "Mama Put Kitchen", "owner@mamaput.ng").await;
        (db, business, owner)
    }

    pub async fn register(db: &Database, name: &str, email: &str) -> (Business, User) {
        db.businesses()
            .register(
                name,
                "NGN",
                NewOwner {
                    name: "Owner".to_string(),
                    email: email.to_string(),
                    password_hash: "hash".to_string(),
                },
            )
            .await
            .unwrap()
    }

    pub async fn product(db: &Database, business_id: &str, name: &str, qty: i64) -> Product {
        db.products()
            .create(
                business_id,
                NewProduct {
                    name: name.to_string(),
                    sku: None,
                    category: None,
                    description: None,
                    unit: "pcs".to_string(),
                    price_cents: 500,
                    cost_cents: 300,
                    quantity: qty,
                    low_stock_threshold: None,
                },
            )
            .await
            .unwrap()
    }
}
