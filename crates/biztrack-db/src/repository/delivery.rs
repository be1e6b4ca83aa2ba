//! Delivery CRUD.

use biztrack_core::{Delivery, DeliveryStatus, NewDelivery};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{expect_one, new_id};
use crate::error::{DbError, DbResult};

const SELECT_DELIVERY: &str = "SELECT id, business_id, supplier_id, customer_name, address, status, \
     scheduled_at, delivered_at, notes, created_at, updated_at FROM deliveries";

#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: SqlitePool,
}

impl DeliveryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DeliveryRepository { pool }
    }

    /// All deliveries of a business, newest first.
    pub async fn list(&self, business_id: &str) -> DbResult<Vec<Delivery>> {
        let sql = format!("{SELECT_DELIVERY} WHERE business_id = ?1 ORDER BY created_at DESC");
        let deliveries = sqlx::query_as::<_, Delivery>(&sql)
            .bind(business_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(deliveries)
    }

    pub async fn get(&self, business_id: &str, id: &str) -> DbResult<Delivery> {
        let sql = format!("{SELECT_DELIVERY} WHERE id = ?1 AND business_id = ?2");
        sqlx::query_as::<_, Delivery>(&sql)
            .bind(id)
            .bind(business_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Delivery", id))
    }

    /// Creates a delivery. A supplier, when given, must belong to the
    /// same business.
    pub async fn create(&self, business_id: &str, input: NewDelivery) -> DbResult<Delivery> {
        if let Some(supplier_id) = &input.supplier_id {
            self.ensure_supplier(business_id, supplier_id).await?;
        }

        let now = Utc::now();
        let delivery = Delivery {
            id: new_id(),
            business_id: business_id.to_string(),
            supplier_id: input.supplier_id,
            customer_name: input.customer_name,
            address: input.address,
            status: input.status,
            scheduled_at: input.scheduled_at,
            delivered_at: (input.status == DeliveryStatus::Delivered).then_some(now),
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO deliveries
                (id, business_id, supplier_id, customer_name, address, status, scheduled_at,
                 delivered_at, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&delivery.id)
        .bind(&delivery.business_id)
        .bind(&delivery.supplier_id)
        .bind(&delivery.customer_name)
        .bind(&delivery.address)
        .bind(delivery.status)
        .bind(delivery.scheduled_at)
        .bind(delivery.delivered_at)
        .bind(&delivery.notes)
        .bind(delivery.created_at)
        .bind(delivery.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %delivery.id, status = ?delivery.status, "Delivery created");
        Ok(delivery)
    }

    pub async fn save(&self, delivery: &Delivery) -> DbResult<Delivery> {
        if let Some(supplier_id) = &delivery.supplier_id {
            self.ensure_supplier(&delivery.business_id, supplier_id).await?;
        }

        let result = sqlx::query(
            "UPDATE deliveries SET
                supplier_id = ?1, customer_name = ?2, address = ?3, status = ?4,
                scheduled_at = ?5, delivered_at = ?6, notes = ?7, updated_at = ?8
             WHERE id = ?9 AND business_id = ?10",
        )
        .bind(&delivery.supplier_id)
        .bind(&delivery.customer_name)
        .bind(&delivery.address)
        .bind(delivery.status)
        .bind(delivery.scheduled_at)
        .bind(delivery.delivered_at)
        .bind(&delivery.notes)
        .bind(Utc::now())
        .bind(&delivery.id)
        .bind(&delivery.business_id)
        .execute(&self.pool)
        .await?;

        expect_one(result, "Delivery", &delivery.id)?;
        self.get(&delivery.business_id, &delivery.id).await
    }

    pub async fn delete(&self, business_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM deliveries WHERE id = ?1 AND business_id = ?2")
            .bind(id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;
        expect_one(result, "Delivery", id)
    }

    async fn ensure_supplier(&self, business_id: &str, supplier_id: &str) -> DbResult<()> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT id FROM suppliers WHERE id = ?1 AND business_id = ?2")
                .bind(supplier_id)
                .bind(business_id)
                .fetch_optional(&self.pool)
                .await?;

        found
            .map(|_| ())
            .ok_or_else(|| DbError::not_found("Supplier", supplier_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{register, setup};
    use biztrack_core::{DeliveryUpdate, NewSupplier};

    fn input() -> NewDelivery {
        NewDelivery {
            supplier_id: None,
            customer_name: Some("Emeka".to_string()),
            address: Some("12 Allen Ave".to_string()),
            status: DeliveryStatus::Pending,
            scheduled_at: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_mark_delivered() {
        let (db, business, _) = setup().await;
        let mut d = db.deliveries().create(&business.id, input()).await.unwrap();
        assert!(d.delivered_at.is_none());

        DeliveryUpdate {
            status: Some(DeliveryStatus::Delivered),
            ..Default::default()
        }
        .apply(&mut d, Utc::now());

        let saved = db.deliveries().save(&d).await.unwrap();
        assert_eq!(saved.status, DeliveryStatus::Delivered);
        assert!(saved.delivered_at.is_some());
    }

    #[tokio::test]
    async fn test_foreign_supplier_rejected() {
        let (db, business, _) = setup().await;
        let (other, _) = register(&db, "Other", "o@other.ng").await;
        let supplier = db
            .suppliers()
            .create(
                &other.id,
                NewSupplier {
                    name: "Theirs".to_string(),
                    contact_name: None,
                    email: None,
                    phone: None,
                    address: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        let err = db
            .deliveries()
            .create(
                &business.id,
                NewDelivery {
                    supplier_id: Some(supplier.id),
                    ..input()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_scoped() {
        let (db, business, _) = setup().await;
        let (other, _) = register(&db, "Other", "o@other.ng").await;
        let d = db.deliveries().create(&business.id, input()).await.unwrap();

        assert!(db.deliveries().delete(&other.id, &d.id).await.is_err());
        db.deliveries().delete(&business.id, &d.id).await.unwrap();
        assert!(db.deliveries().list(&business.id).await.unwrap().is_empty());
    }
}
