//! # Business Repository
//!
//! Tenants and their registration.
//!
//! ## Signup
//! ```text
//! register("Mama Put Kitchen", owner)
//!      │
//!      ▼  BEGIN
//! INSERT businesses (owner_id = NULL)
//! INSERT users      (role = owner, email_verified = 0)
//! UPDATE businesses SET owner_id = user.id
//!      │  COMMIT
//!      ▼
//! (Business, User)   ← a duplicate email rolls back all three
//! ```

use biztrack_core::{Business, Role, User};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::new_id;
use crate::error::{DbError, DbResult};

const SELECT_BUSINESS: &str =
    "SELECT id, name, owner_id, currency, created_at, updated_at FROM businesses";

/// Owner account details for [`BusinessRepository::register`].
#[derive(Debug, Clone)]
pub struct NewOwner {
    pub name: String,
    pub email: String,
    /// Already hashed by the caller.
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct BusinessRepository {
    pool: SqlitePool,
}

impl BusinessRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BusinessRepository { pool }
    }

    /// Creates a business and its unverified owner in one transaction.
    pub async fn register(
        &self,
        business_name: &str,
        currency: &str,
        owner: NewOwner,
    ) -> DbResult<(Business, User)> {
        let now = Utc::now();
        let email = owner.email.trim().to_lowercase();

        let business = Business {
            id: new_id(),
            name: business_name.trim().to_string(),
            owner_id: None,
            currency: currency.to_string(),
            created_at: now,
            updated_at: now,
        };

        let user = User {
            id: new_id(),
            business_id: business.id.clone(),
            name: owner.name.trim().to_string(),
            email: email.clone(),
            password_hash: owner.password_hash,
            role: Role::Owner,
            email_verified: false,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO businesses (id, name, owner_id, currency, created_at, updated_at)
             VALUES (?1, ?2, NULL, ?3, ?4, ?5)",
        )
        .bind(&business.id)
        .bind(&business.name)
        .bind(&business.currency)
        .bind(business.created_at)
        .bind(business.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO users
                (id, business_id, name, email, password_hash, role, email_verified, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&user.id)
        .bind(&user.business_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.email_verified)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: email.clone(),
            },
            other => other,
        })?;

        sqlx::query("UPDATE businesses SET owner_id = ?1 WHERE id = ?2")
            .bind(&user.id)
            .bind(&business.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(business_id = %business.id, email = %user.email, "Business registered");

        Ok((
            Business {
                owner_id: Some(user.id.clone()),
                ..business
            },
            user,
        ))
    }

    pub async fn get(&self, id: &str) -> DbResult<Business> {
        debug!(id = %id, "Fetching business");

        let sql = format!("{SELECT_BUSINESS} WHERE id = ?1");
        sqlx::query_as::<_, Business>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Business", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::setup;

    #[tokio::test]
    async fn test_register_links_owner() {
        let (db, business, owner) = setup().await;

        assert_eq!(business.owner_id.as_deref(), Some(owner.id.as_str()));
        assert_eq!(owner.role, Role::Owner);
        assert!(!owner.email_verified);

        let stored = db.businesses().get(&business.id).await.unwrap();
        assert_eq!(stored.owner_id, business.owner_id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rolls_back() {
        let (db, _, _) = setup().await;

        let result = db
            .businesses()
            .register(
                "Second Shop",
                "NGN",
                NewOwner {
                    name: "Someone".to_string(),
                    email: "OWNER@mamaput.ng".to_string(),
                    password_hash: "hash".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM businesses")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
