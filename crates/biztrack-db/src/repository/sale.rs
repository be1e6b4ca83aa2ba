//! # Sale Repository
//!
//! Sales, their line items, and the stock and debt side effects.
//!
//! ## Recording a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(business, user, NewSale)                    one transaction     │
//! │                                                                         │
//! │  for each line:                                                         │
//! │     load product (business scoped)      ── missing  → NotFound         │
//! │     price = override or product price                                   │
//! │     line = price × quantity             ── overflow → AmountTooLarge   │
//! │     quantity -= line quantity           ── too low  → InsufficientStock│
//! │                                                                         │
//! │  INSERT sales (total = Σ lines, paid = min(paid, total))                │
//! │  INSERT sale_items (price frozen at time of sale)                       │
//! │                                                                         │
//! │  paid < total?                                                          │
//! │     INSERT debts (amount = total, amount_paid = paid, sale_id)          │
//! │                                                                         │
//! │  COMMIT → (Sale with items, Option<Debt>)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting a sale puts its quantities back into stock. A debt opened by the
//! sale survives with `sale_id` cleared.

use std::collections::HashMap;

use biztrack_core::{
    CoreError, Debt, DebtStatus, Money, NewSale, Product, Sale, SaleItem, SaleStatus,
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::product::{self as product_repo, SELECT_PRODUCT};
use super::{debt as debt_repo, expect_one, new_id};
use crate::error::{DbError, DbResult};

const SELECT_SALE: &str = "SELECT id, business_id, customer_name, status, payment_method, \
     total_cents, amount_paid_cents, notes, created_by, created_at, updated_at FROM sales";

const SELECT_ITEM: &str = "SELECT id, sale_id, product_id, quantity, unit_price_cents, \
     line_total_cents, created_at FROM sale_items";

/// Customer name used on debts from sales with no named customer.
const WALK_IN_CUSTOMER: &str = "Walk-in customer";

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// All sales of a business, newest first, with items and their products.
    pub async fn list(&self, business_id: &str) -> DbResult<Vec<Sale>> {
        let sql = format!("{SELECT_SALE} WHERE business_id = ?1 ORDER BY created_at DESC");
        let mut sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(business_id)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!(
            "{SELECT_ITEM} WHERE sale_id IN (SELECT id FROM sales WHERE business_id = ?1) \
             ORDER BY created_at"
        );
        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(business_id)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("{SELECT_PRODUCT} WHERE business_id = ?1");
        let products: HashMap<String, Product> = sqlx::query_as::<_, Product>(&sql)
            .bind(business_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let mut by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for mut item in items {
            item.product = products.get(&item.product_id).cloned();
            by_sale.entry(item.sale_id.clone()).or_default().push(item);
        }
        for sale in &mut sales {
            sale.items = by_sale.remove(&sale.id).unwrap_or_default();
        }

        debug!(business_id = %business_id, count = sales.len(), "Listed sales");
        Ok(sales)
    }

    pub async fn get(&self, business_id: &str, id: &str) -> DbResult<Sale> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, business_id, id).await
    }

    /// Records a sale. See the module docs for the steps.
    pub async fn create(
        &self,
        business_id: &str,
        created_by: Option<&str>,
        input: NewSale,
    ) -> DbResult<(Sale, Option<Debt>)> {
        if input.items.is_empty() {
            return Err(CoreError::EmptySale.into());
        }

        let now = Utc::now();
        let sale_id = new_id();
        let mut tx = self.pool.begin().await?;

        let mut items = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let product = product_repo::fetch(&mut *tx, business_id, &line.product_id).await?;
            if !product.is_active {
                return Err(CoreError::not_found("Product", &product.id).into());
            }

            let unit_price = line.unit_price_cents.unwrap_or(product.price_cents);
            let line_total = Money::from_cents(unit_price)
                .checked_multiply_quantity(line.quantity)
                .ok_or(CoreError::AmountTooLarge)?;
            product_repo::change_stock(&mut *tx, business_id, &product.id, -line.quantity)
                .await?;

            items.push(SaleItem {
                id: new_id(),
                sale_id: sale_id.clone(),
                product_id: product.id.clone(),
                quantity: line.quantity,
                unit_price_cents: unit_price,
                line_total_cents: line_total.cents(),
                created_at: now,
                product: Some(product),
            });
        }

        let total = Money::checked_sum(
            items.iter().map(|i| Money::from_cents(i.line_total_cents)),
        )
        .ok_or(CoreError::AmountTooLarge)?;
        let paid = input
            .amount_paid_cents
            .unwrap_or(total.cents())
            .clamp(0, total.cents());

        let mut sale = Sale {
            id: sale_id,
            business_id: business_id.to_string(),
            customer_name: input.customer_name.clone(),
            status: SaleStatus::Completed,
            payment_method: input.payment_method,
            total_cents: total.cents(),
            amount_paid_cents: paid,
            notes: input.notes.clone(),
            created_by: created_by.map(str::to_string),
            created_at: now,
            updated_at: now,
            items: Vec::new(),
        };

        sqlx::query(
            "INSERT INTO sales
                (id, business_id, customer_name, status, payment_method, total_cents,
                 amount_paid_cents, notes, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&sale.id)
        .bind(&sale.business_id)
        .bind(&sale.customer_name)
        .bind(sale.status)
        .bind(sale.payment_method)
        .bind(sale.total_cents)
        .bind(sale.amount_paid_cents)
        .bind(&sale.notes)
        .bind(&sale.created_by)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                "INSERT INTO sale_items
                    (id, sale_id, product_id, quantity, unit_price_cents, line_total_cents, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.line_total_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        let debt = if sale.balance_due().is_positive() {
            let debt = Debt {
                id: new_id(),
                business_id: business_id.to_string(),
                customer_name: input
                    .customer_name
                    .clone()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| WALK_IN_CUSTOMER.to_string()),
                customer_phone: input.customer_phone.clone(),
                sale_id: Some(sale.id.clone()),
                amount_cents: sale.total_cents,
                amount_paid_cents: sale.amount_paid_cents,
                status: DebtStatus::from_amounts(sale.total_cents, sale.amount_paid_cents),
                due_date: input.due_date,
                notes: None,
                created_at: now,
                updated_at: now,
                payments: Vec::new(),
            };
            debt_repo::insert(&mut *tx, &debt).await?;
            Some(debt)
        } else {
            None
        };

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            total = sale.total_cents,
            items = items.len(),
            on_credit = debt.is_some(),
            "Sale recorded"
        );

        sale.items = items;
        Ok((sale, debt))
    }

    /// Deletes a sale and restores its stock.
    pub async fn delete(&self, business_id: &str, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let sale = fetch(&mut *tx, business_id, id).await?;
        for item in &sale.items {
            // Product may have been removed since; nothing to restore then.
            match product_repo::change_stock(&mut *tx, business_id, &item.product_id, item.quantity)
                .await
            {
                Ok(()) | Err(DbError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1 AND business_id = ?2")
            .bind(id)
            .bind(business_id)
            .execute(&mut *tx)
            .await?;
        expect_one(result, "Sale", id)?;

        tx.commit().await?;
        info!(sale_id = %id, "Sale deleted, stock restored");
        Ok(())
    }
}

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    business_id: &str,
    id: &str,
) -> DbResult<Sale> {
    let sql = format!("{SELECT_SALE} WHERE id = ?1 AND business_id = ?2");
    let mut sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .bind(business_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Sale", id))?;

    let sql = format!("{SELECT_ITEM} WHERE sale_id = ?1 ORDER BY created_at");
    let mut items = sqlx::query_as::<_, SaleItem>(&sql)
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

    for item in &mut items {
        item.product = match product_repo::fetch(&mut *conn, business_id, &item.product_id).await {
            Ok(p) => Some(p),
            Err(DbError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };
    }

    sale.items = items;
    Ok(sale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{product, register, setup};
    use biztrack_core::{NewSaleItem, PaymentMethod};

    fn sale(lines: Vec<(&str, i64)>, paid: Option<i64>) -> NewSale {
        NewSale {
            customer_name: Some("Ngozi".to_string()),
            customer_phone: None,
            payment_method: PaymentMethod::Cash,
            amount_paid_cents: paid,
            due_date: None,
            notes: None,
            items: lines
                .into_iter()
                .map(|(id, qty)| NewSaleItem {
                    product_id: id.to_string(),
                    quantity: qty,
                    unit_price_cents: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_sale_decrements_stock() {
        let (db, business, owner) = setup().await;
        let p = product(&db, &business.id, "Bread", 10).await;

        let (recorded, debt) = db
            .sales()
            .create(&business.id, Some(owner.id.as_str()), sale(vec![(p.id.as_str(), 3)], None))
            .await
            .unwrap();

        assert_eq!(recorded.total_cents, 1500);
        assert_eq!(recorded.amount_paid_cents, 1500);
        assert_eq!(recorded.items.len(), 1);
        assert!(recorded.items[0].product.is_some());
        assert!(debt.is_none());

        let after = db.products().get(&business.id, &p.id).await.unwrap();
        assert_eq!(after.quantity, 7);
    }

    #[tokio::test]
    async fn test_partial_payment_opens_debt() {
        let (db, business, _) = setup().await;
        let p = product(&db, &business.id, "Rice", 10).await;

        let (recorded, debt) = db
            .sales()
            .create(&business.id, None, sale(vec![(p.id.as_str(), 2)], Some(400)))
            .await
            .unwrap();

        let debt = debt.unwrap();
        assert_eq!(debt.sale_id.as_deref(), Some(recorded.id.as_str()));
        assert_eq!(debt.amount_cents, 1000);
        assert_eq!(debt.outstanding().cents(), 600);
        assert_eq!(debt.status, DebtStatus::Partial);
        assert_eq!(debt.customer_name, "Ngozi");

        assert_eq!(db.debts().list(&business.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let (db, business, _) = setup().await;
        let a = product(&db, &business.id, "A", 10).await;
        let b = product(&db, &business.id, "B", 1).await;

        let err = db
            .sales()
            .create(&business.id, None, sale(vec![(a.id.as_str(), 5), (b.id.as_str(), 2)], None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::InsufficientStock { .. })));

        // First line's decrement was rolled back too.
        let a_after = db.products().get(&business.id, &a.id).await.unwrap();
        assert_eq!(a_after.quantity, 10);
        assert!(db.sales().list(&business.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_product_lines_accumulate() {
        let (db, business, _) = setup().await;
        let p = product(&db, &business.id, "Egg", 5).await;

        let result = db
            .sales()
            .create(&business.id, None, sale(vec![(p.id.as_str(), 3), (p.id.as_str(), 3)], None))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_other_business_product_is_not_found() {
        let (db, business, _) = setup().await;
        let (other, _) = register(&db, "Other", "o@other.ng").await;
        let foreign = product(&db, &other.id, "Foreign", 10).await;

        let err = db
            .sales()
            .create(&business.id, None, sale(vec![(foreign.id.as_str(), 1)], None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_restores_stock_and_keeps_debt() {
        let (db, business, _) = setup().await;
        let p = product(&db, &business.id, "Garri", 10).await;
        let (recorded, _) = db
            .sales()
            .create(&business.id, None, sale(vec![(p.id.as_str(), 4)], Some(0)))
            .await
            .unwrap();

        db.sales().delete(&business.id, &recorded.id).await.unwrap();

        let after = db.products().get(&business.id, &p.id).await.unwrap();
        assert_eq!(after.quantity, 10);

        let debts = db.debts().list(&business.id).await.unwrap();
        assert_eq!(debts.len(), 1);
        assert_eq!(debts[0].sale_id, None);
    }

    #[tokio::test]
    async fn test_overflowing_line_total_is_rejected() {
        let (db, business, _) = setup().await;
        let p = product(&db, &business.id, "Gold", 50).await;

        let mut input = sale(vec![(p.id.as_str(), 10)], None);
        input.items[0].unit_price_cents = Some(i64::MAX / 2);

        let err = db.sales().create(&business.id, None, input).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::AmountTooLarge)));

        let after = db.products().get(&business.id, &p.id).await.unwrap();
        assert_eq!(after.quantity, 50);
        assert!(db.sales().list(&business.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_sale_total_is_rejected() {
        let (db, business, _) = setup().await;
        let a = product(&db, &business.id, "A", 10).await;
        let b = product(&db, &business.id, "B", 10).await;

        let mut input = sale(vec![(a.id.as_str(), 1), (b.id.as_str(), 1)], None);
        input.items[0].unit_price_cents = Some(i64::MAX);
        input.items[1].unit_price_cents = Some(1);

        let err = db.sales().create(&business.id, None, input).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::AmountTooLarge)));
    }

    #[tokio::test]
    async fn test_empty_sale() {
        let (db, business, _) = setup().await;
        let err = db
            .sales()
            .create(&business.id, None, sale(vec![], None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::EmptySale)));
    }
}
