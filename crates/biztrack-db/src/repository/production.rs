//! # Production Repository
//!
//! Production runs and the stock they generate.
//!
//! ## Stock Effect of Status Changes
//! ```text
//! ┌───────────────────────────┬─────────────────────────────────────────────┐
//! │ before → after            │ stock change on the product                 │
//! ├───────────────────────────┼─────────────────────────────────────────────┤
//! │ not completed → completed │ + new quantity, produced_at stamped          │
//! │ completed → completed     │ + (new quantity − old quantity)              │
//! │ completed → not completed │ − old quantity (refused if already sold)     │
//! │ not completed → not …     │ none                                         │
//! └───────────────────────────┴─────────────────────────────────────────────┘
//! ```

use biztrack_core::{NewProduction, Production, ProductionStatus, ProductionUpdate};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::product as product_repo;
use super::{expect_one, new_id};
use crate::error::{DbError, DbResult};

const SELECT_PRODUCTION: &str = "SELECT id, business_id, product_id, quantity, cost_cents, status, \
     notes, produced_at, created_at, updated_at FROM productions";

#[derive(Debug, Clone)]
pub struct ProductionRepository {
    pool: SqlitePool,
}

impl ProductionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductionRepository { pool }
    }

    pub async fn list(&self, business_id: &str) -> DbResult<Vec<Production>> {
        let sql = format!("{SELECT_PRODUCTION} WHERE business_id = ?1 ORDER BY created_at DESC");
        let runs = sqlx::query_as::<_, Production>(&sql)
            .bind(business_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(runs)
    }

    pub async fn get(&self, business_id: &str, id: &str) -> DbResult<Production> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, business_id, id).await
    }

    pub async fn create(&self, business_id: &str, input: NewProduction) -> DbResult<Production> {
        let now = Utc::now();
        let completed = input.status == ProductionStatus::Completed;
        let run = Production {
            id: new_id(),
            business_id: business_id.to_string(),
            product_id: input.product_id,
            quantity: input.quantity,
            cost_cents: input.cost_cents,
            status: input.status,
            notes: input.notes,
            produced_at: completed.then_some(now),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        // Scopes the product to this business.
        product_repo::fetch(&mut *tx, business_id, &run.product_id).await?;

        sqlx::query(
            "INSERT INTO productions
                (id, business_id, product_id, quantity, cost_cents, status, notes,
                 produced_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&run.id)
        .bind(&run.business_id)
        .bind(&run.product_id)
        .bind(run.quantity)
        .bind(run.cost_cents)
        .bind(run.status)
        .bind(&run.notes)
        .bind(run.produced_at)
        .bind(run.created_at)
        .bind(run.updated_at)
        .execute(&mut *tx)
        .await?;

        if completed {
            product_repo::change_stock(&mut *tx, business_id, &run.product_id, run.quantity)
                .await?;
        }

        tx.commit().await?;

        debug!(id = %run.id, status = ?run.status, "Production created");
        Ok(run)
    }

    /// Applies an update and moves stock according to the status change.
    pub async fn update(
        &self,
        business_id: &str,
        id: &str,
        update: ProductionUpdate,
    ) -> DbResult<Production> {
        let mut tx = self.pool.begin().await?;
        let before = fetch(&mut *tx, business_id, id).await?;

        let now = Utc::now();
        let mut after = before.clone();
        if let Some(quantity) = update.quantity {
            after.quantity = quantity;
        }
        if let Some(cost) = update.cost_cents {
            after.cost_cents = cost;
        }
        if update.notes.is_some() {
            after.notes = update.notes;
        }
        if let Some(status) = update.status {
            after.status = status;
        }

        let was = before.status == ProductionStatus::Completed;
        let now_completed = after.status == ProductionStatus::Completed;
        let delta = match (was, now_completed) {
            (false, true) => {
                after.produced_at = Some(now);
                after.quantity
            }
            (true, true) => after.quantity - before.quantity,
            (true, false) => {
                after.produced_at = None;
                -before.quantity
            }
            (false, false) => 0,
        };

        if delta != 0 {
            product_repo::change_stock(&mut *tx, business_id, &after.product_id, delta).await?;
        }

        let result = sqlx::query(
            "UPDATE productions SET
                quantity = ?1, cost_cents = ?2, status = ?3, notes = ?4, produced_at = ?5,
                updated_at = ?6
             WHERE id = ?7 AND business_id = ?8",
        )
        .bind(after.quantity)
        .bind(after.cost_cents)
        .bind(after.status)
        .bind(&after.notes)
        .bind(after.produced_at)
        .bind(now)
        .bind(id)
        .bind(business_id)
        .execute(&mut *tx)
        .await?;
        expect_one(result, "Production", id)?;

        tx.commit().await?;

        if delta != 0 {
            info!(production_id = %id, product_id = %after.product_id, delta, "Production moved stock");
        }

        after.updated_at = now;
        Ok(after)
    }

    /// Deletes a production record. Stock already added stays.
    pub async fn delete(&self, business_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM productions WHERE id = ?1 AND business_id = ?2")
            .bind(id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;
        expect_one(result, "Production", id)
    }
}

async fn fetch(conn: &mut SqliteConnection, business_id: &str, id: &str) -> DbResult<Production> {
    let sql = format!("{SELECT_PRODUCTION} WHERE id = ?1 AND business_id = ?2");
    sqlx::query_as::<_, Production>(&sql)
        .bind(id)
        .bind(business_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Production", id))
}
