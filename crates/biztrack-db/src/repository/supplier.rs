//! Supplier CRUD.

use biztrack_core::{NewSupplier, Supplier};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{expect_one, new_id};
use crate::error::{DbError, DbResult};

const SELECT_SUPPLIER: &str = "SELECT id, business_id, name, contact_name, email, phone, address, \
     notes, created_at, updated_at FROM suppliers";

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn list(&self, business_id: &str) -> DbResult<Vec<Supplier>> {
        let sql = format!("{SELECT_SUPPLIER} WHERE business_id = ?1 ORDER BY name");
        let suppliers = sqlx::query_as::<_, Supplier>(&sql)
            .bind(business_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(suppliers)
    }

    pub async fn get(&self, business_id: &str, id: &str) -> DbResult<Supplier> {
        let sql = format!("{SELECT_SUPPLIER} WHERE id = ?1 AND business_id = ?2");
        sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .bind(business_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    pub async fn create(&self, business_id: &str, input: NewSupplier) -> DbResult<Supplier> {
        let now = Utc::now();
        let supplier = Supplier {
            id: new_id(),
            business_id: business_id.to_string(),
            name: input.name.trim().to_string(),
            contact_name: input.contact_name,
            email: input.email.map(|e| e.trim().to_lowercase()),
            phone: input.phone,
            address: input.address,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO suppliers
                (id, business_id, name, contact_name, email, phone, address, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&supplier.id)
        .bind(&supplier.business_id)
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(&supplier.notes)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %supplier.id, "Supplier created");
        Ok(supplier)
    }

    pub async fn save(&self, supplier: &Supplier) -> DbResult<Supplier> {
        let result = sqlx::query(
            "UPDATE suppliers SET
                name = ?1, contact_name = ?2, email = ?3, phone = ?4, address = ?5,
                notes = ?6, updated_at = ?7
             WHERE id = ?8 AND business_id = ?9",
        )
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(&supplier.notes)
        .bind(Utc::now())
        .bind(&supplier.id)
        .bind(&supplier.business_id)
        .execute(&self.pool)
        .await?;

        expect_one(result, "Supplier", &supplier.id)?;
        self.get(&supplier.business_id, &supplier.id).await
    }

    pub async fn delete(&self, business_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1 AND business_id = ?2")
            .bind(id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;
        expect_one(result, "Supplier", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{register, setup};
    use biztrack_core::SupplierUpdate;

    fn input(name: &str) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            contact_name: Some("Bola".to_string()),
            email: Some("Sales@Flour.ng".to_string()),
            phone: None,
            address: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let (db, business, _) = setup().await;
        let repo = db.suppliers();

        let mut s = repo.create(&business.id, input("Flour Co")).await.unwrap();
        assert_eq!(s.email.as_deref(), Some("sales@flour.ng"));

        SupplierUpdate {
            phone: Some("0803".to_string()),
            ..Default::default()
        }
        .apply(&mut s);
        let saved = repo.save(&s).await.unwrap();
        assert_eq!(saved.phone.as_deref(), Some("0803"));

        repo.delete(&business.id, &s.id).await.unwrap();
        assert!(repo.list(&business.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scoped_by_business() {
        let (db, business, _) = setup().await;
        let (other, _) = register(&db, "Other", "x@other.ng").await;
        let s = db.suppliers().create(&business.id, input("Sugar Co")).await.unwrap();

        assert!(db.suppliers().get(&other.id, &s.id).await.is_err());
        assert!(db.suppliers().delete(&other.id, &s.id).await.is_err());
        assert_eq!(db.suppliers().list(&business.id).await.unwrap().len(), 1);
    }
}
