//! # Product Repository
//!
//! Database operations for products and their stock levels.
//!
//! ## Stock Changes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Who moves stock                         Direction                      │
//! │  ───────────────────────────────────────────────────────────────────   │
//! │  POST /api/products/{id}/stock           ± delta (manual correction)   │
//! │  POST /api/sales                         − quantity per line           │
//! │  DELETE /api/sales/{id}                  + quantity per line           │
//! │  production → completed                  + produced quantity           │
//! │                                                                         │
//! │  All go through `change_stock`, which refuses to go below zero.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use biztrack_core::{CoreError, NewProduct, Product, DEFAULT_LOW_STOCK_THRESHOLD};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::{expect_one, new_id};
use crate::error::{DbError, DbResult};

pub(crate) const SELECT_PRODUCT: &str = "SELECT id, business_id, name, sku, category, description, \
     unit, price_cents, cost_cents, quantity, low_stock_threshold, is_active, created_at, updated_at \
     FROM products";

#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// All products of a business, by name.
    pub async fn list(&self, business_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE business_id = ?1 ORDER BY name");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(business_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(business_id = %business_id, count = products.len(), "Listed products");
        Ok(products)
    }

    /// Active products at or below their low-stock threshold.
    pub async fn low_stock(&self, business_id: &str) -> DbResult<Vec<Product>> {
        let products = self.list(business_id).await?;
        Ok(products
            .into_iter()
            .filter(|p| p.is_active && p.is_low_stock())
            .collect())
    }

    pub async fn get(&self, business_id: &str, id: &str) -> DbResult<Product> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, business_id, id).await
    }

    pub async fn create(&self, business_id: &str, input: NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: new_id(),
            business_id: business_id.to_string(),
            name: input.name.trim().to_string(),
            sku: input.sku.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            category: input.category,
            description: input.description,
            unit: input.unit,
            price_cents: input.price_cents,
            cost_cents: input.cost_cents,
            quantity: input.quantity,
            low_stock_threshold: input
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO products
                (id, business_id, name, sku, category, description, unit, price_cents,
                 cost_cents, quantity, low_stock_threshold, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .bind(&product.id)
        .bind(&product.business_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.category)
        .bind(&product.description)
        .bind(&product.unit)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.quantity)
        .bind(product.low_stock_threshold)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| with_sku(e, product.sku.as_deref()))?;

        debug!(id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Writes every editable column of `product`. Quantity is left alone;
    /// stock only moves through [`adjust_stock`](Self::adjust_stock).
    pub async fn save(&self, product: &Product) -> DbResult<Product> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE products SET
                name = ?1, sku = ?2, category = ?3, description = ?4, unit = ?5,
                price_cents = ?6, cost_cents = ?7, low_stock_threshold = ?8,
                is_active = ?9, updated_at = ?10
             WHERE id = ?11 AND business_id = ?12",
        )
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.category)
        .bind(&product.description)
        .bind(&product.unit)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.low_stock_threshold)
        .bind(product.is_active)
        .bind(now)
        .bind(&product.id)
        .bind(&product.business_id)
        .execute(&self.pool)
        .await
        .map_err(|e| with_sku(e, product.sku.as_deref()))?;

        expect_one(result, "Product", &product.id)?;
        self.get(&product.business_id, &product.id).await
    }

    /// Deletes a product. Fails with a foreign key violation when the
    /// product appears on a recorded sale.
    pub async fn delete(&self, business_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1 AND business_id = ?2")
            .bind(id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;
        expect_one(result, "Product", id)
    }

    /// Applies a manual stock correction and returns the updated product.
    pub async fn adjust_stock(&self, business_id: &str, id: &str, delta: i64) -> DbResult<Product> {
        let mut conn = self.pool.acquire().await?;
        change_stock(&mut conn, business_id, id, delta).await?;
        fetch(&mut conn, business_id, id).await
    }
}

// =============================================================================
// Connection-level helpers (usable inside transactions)
// =============================================================================

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    business_id: &str,
    id: &str,
) -> DbResult<Product> {
    let sql = format!("{SELECT_PRODUCT} WHERE id = ?1 AND business_id = ?2");
    sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .bind(business_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))
}

/// Moves stock by `delta`, refusing to go below zero.
pub(crate) async fn change_stock(
    conn: &mut SqliteConnection,
    business_id: &str,
    id: &str,
    delta: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE products SET quantity = quantity + ?1, updated_at = ?2
         WHERE id = ?3 AND business_id = ?4 AND quantity + ?1 >= 0",
    )
    .bind(delta)
    .bind(Utc::now())
    .bind(id)
    .bind(business_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        // Either the product is missing or the stock is too low.
        let product = fetch(conn, business_id, id).await?;
        return Err(CoreError::InsufficientStock {
            product: product.name,
            available: product.quantity,
            requested: delta.saturating_neg(),
        }
        .into());
    }

    debug!(id = %id, delta, "Stock changed");
    Ok(())
}

fn with_sku(err: sqlx::Error, sku: Option<&str>) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("sku", sku.unwrap_or_default()),
        other => other,
    }
}
