//! # Debt Repository
//!
//! Customer debts and their repayments.
//!
//! ## Repayment
//! ```text
//! add_payment(debt, 400)
//!      │  BEGIN
//!      ▼
//! load debt (business scoped)
//!      │
//!      ├── 400 > outstanding? → Overpayment, ROLLBACK
//!      ▼
//! INSERT debt_payments
//! UPDATE debts SET amount_paid_cents += 400, status = derived
//!      │  COMMIT
//!      ▼
//! Debt { status: partial | paid, payments: [...] }
//! ```

use std::collections::HashMap;

use biztrack_core::{
    CoreError, Debt, DebtPayment, DebtStatus, NewDebt, NewDebtPayment,
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::{expect_one, new_id};
use crate::error::{DbError, DbResult};

const SELECT_DEBT: &str = "SELECT id, business_id, customer_name, customer_phone, sale_id, \
     amount_cents, amount_paid_cents, status, due_date, notes, created_at, updated_at FROM debts";

const SELECT_PAYMENT: &str =
    "SELECT id, debt_id, amount_cents, method, note, created_at FROM debt_payments";

#[derive(Debug, Clone)]
pub struct DebtRepository {
    pool: SqlitePool,
}

impl DebtRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DebtRepository { pool }
    }

    /// All debts of a business, newest first, with their payments.
    pub async fn list(&self, business_id: &str) -> DbResult<Vec<Debt>> {
        let sql = format!("{SELECT_DEBT} WHERE business_id = ?1 ORDER BY created_at DESC");
        let mut debts = sqlx::query_as::<_, Debt>(&sql)
            .bind(business_id)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!(
            "{SELECT_PAYMENT} WHERE debt_id IN (SELECT id FROM debts WHERE business_id = ?1) \
             ORDER BY created_at"
        );
        let payments = sqlx::query_as::<_, DebtPayment>(&sql)
            .bind(business_id)
            .fetch_all(&self.pool)
            .await?;

        let mut by_debt: HashMap<String, Vec<DebtPayment>> = HashMap::new();
        for payment in payments {
            by_debt.entry(payment.debt_id.clone()).or_default().push(payment);
        }
        for debt in &mut debts {
            debt.payments = by_debt.remove(&debt.id).unwrap_or_default();
        }

        Ok(debts)
    }

    pub async fn get(&self, business_id: &str, id: &str) -> DbResult<Debt> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, business_id, id).await
    }

    /// Records a debt. A linked sale must belong to the same business.
    pub async fn create(&self, business_id: &str, input: NewDebt) -> DbResult<Debt> {
        if let Some(sale_id) = &input.sale_id {
            self.ensure_sale(business_id, sale_id).await?;
        }

        let now = Utc::now();
        let debt = Debt {
            id: new_id(),
            business_id: business_id.to_string(),
            customer_name: input.customer_name.trim().to_string(),
            customer_phone: input.customer_phone,
            sale_id: input.sale_id,
            amount_cents: input.amount_cents,
            amount_paid_cents: input.amount_paid_cents,
            status: DebtStatus::from_amounts(input.amount_cents, input.amount_paid_cents),
            due_date: input.due_date,
            notes: input.notes,
            created_at: now,
            updated_at: now,
            payments: Vec::new(),
        };

        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, &debt).await?;

        debug!(id = %debt.id, amount = debt.amount_cents, "Debt recorded");
        Ok(debt)
    }

    /// Writes the editable columns and the derived status.
    pub async fn save(&self, debt: &Debt) -> DbResult<Debt> {
        let status = DebtStatus::from_amounts(debt.amount_cents, debt.amount_paid_cents);
        let result = sqlx::query(
            "UPDATE debts SET
                customer_name = ?1, customer_phone = ?2, amount_cents = ?3, status = ?4,
                due_date = ?5, notes = ?6, updated_at = ?7
             WHERE id = ?8 AND business_id = ?9",
        )
        .bind(&debt.customer_name)
        .bind(&debt.customer_phone)
        .bind(debt.amount_cents)
        .bind(status)
        .bind(debt.due_date)
        .bind(&debt.notes)
        .bind(Utc::now())
        .bind(&debt.id)
        .bind(&debt.business_id)
        .execute(&self.pool)
        .await?;

        expect_one(result, "Debt", &debt.id)?;
        self.get(&debt.business_id, &debt.id).await
    }

    pub async fn delete(&self, business_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM debts WHERE id = ?1 AND business_id = ?2")
            .bind(id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;
        expect_one(result, "Debt", id)
    }

    /// Records a repayment and returns the updated debt.
    pub async fn add_payment(
        &self,
        business_id: &str,
        debt_id: &str,
        input: NewDebtPayment,
    ) -> DbResult<Debt> {
        let mut tx = self.pool.begin().await?;

        let debt = fetch(&mut *tx, business_id, debt_id).await?;
        let outstanding = debt.outstanding().cents();
        if input.amount_cents > outstanding {
            return Err(CoreError::Overpayment {
                outstanding_cents: outstanding,
                attempted_cents: input.amount_cents,
            }
            .into());
        }

        let now = Utc::now();
        sqlx::query(
            "INSERT INTO debt_payments (id, debt_id, amount_cents, method, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(new_id())
        .bind(debt_id)
        .bind(input.amount_cents)
        .bind(input.method)
        .bind(&input.note)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let paid = debt.amount_paid_cents + input.amount_cents;
        sqlx::query(
            "UPDATE debts SET amount_paid_cents = ?1, status = ?2, updated_at = ?3
             WHERE id = ?4 AND business_id = ?5",
        )
        .bind(paid)
        .bind(DebtStatus::from_amounts(debt.amount_cents, paid))
        .bind(now)
        .bind(debt_id)
        .bind(business_id)
        .execute(&mut *tx)
        .await?;

        let updated = fetch(&mut *tx, business_id, debt_id).await?;
        tx.commit().await?;

        info!(
            debt_id = %debt_id,
            amount = input.amount_cents,
            status = ?updated.status,
            "Debt payment recorded"
        );
        Ok(updated)
    }

    async fn ensure_sale(&self, business_id: &str, sale_id: &str) -> DbResult<()> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT id FROM sales WHERE id = ?1 AND business_id = ?2")
                .bind(sale_id)
                .bind(business_id)
                .fetch_optional(&self.pool)
                .await?;

        found
            .map(|_| ())
            .ok_or_else(|| DbError::not_found("Sale", sale_id))
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    business_id: &str,
    id: &str,
) -> DbResult<Debt> {
    let sql = format!("{SELECT_DEBT} WHERE id = ?1 AND business_id = ?2");
    let mut debt = sqlx::query_as::<_, Debt>(&sql)
        .bind(id)
        .bind(business_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Debt", id))?;

    let sql = format!("{SELECT_PAYMENT} WHERE debt_id = ?1 ORDER BY created_at");
    debt.payments = sqlx::query_as::<_, DebtPayment>(&sql)
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(debt)
}

pub(crate) async fn insert(conn: &mut SqliteConnection, debt: &Debt) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO debts
            (id, business_id, customer_name, customer_phone, sale_id, amount_cents,
             amount_paid_cents, status, due_date, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(&debt.id)
    .bind(&debt.business_id)
    .bind(&debt.customer_name)
    .bind(&debt.customer_phone)
    .bind(&debt.sale_id)
    .bind(debt.amount_cents)
    .bind(debt.amount_paid_cents)
    .bind(debt.status)
    .bind(debt.due_date)
    .bind(&debt.notes)
    .bind(debt.created_at)
    .bind(debt.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
