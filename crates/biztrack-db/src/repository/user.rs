//! # User Repository
//!
//! Login accounts. Emails are stored lowercased and are unique across all
//! businesses, since login happens before a business is known.

use biztrack_core::User;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::expect_one;
use crate::error::{DbError, DbResult};

const SELECT_USER: &str = "SELECT id, business_id, name, email, password_hash, role, \
     email_verified, created_at, updated_at FROM users";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let email = email.trim().to_lowercase();
        debug!(email = %email, "Looking up user");

        let sql = format!("{SELECT_USER} WHERE email = ?1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get(&self, id: &str) -> DbResult<User> {
        let sql = format!("{SELECT_USER} WHERE id = ?1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    pub async fn mark_verified(&self, id: &str) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE users SET email_verified = 1, updated_at = ?1 WHERE id = ?2")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;
        expect_one(result, "User", id)
    }

    pub async fn update_password(&self, id: &str, password_hash: &str) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(password_hash)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;
        expect_one(result, "User", id)
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::setup;

    #[tokio::test]
    async fn test_find_by_email_is_case_insensitive() {
        let (db, _, owner) = setup().await;

        let found = db
            .users()
            .find_by_email("  Owner@MamaPut.ng ")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, owner.id);

        assert!(db.users().find_by_email("nobody@x.io").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_verified_and_update_password() {
        let (db, _, owner) = setup().await;

        db.users().mark_verified(&owner.id).await.unwrap();
        db.users().update_password(&owner.id, "new-hash").await.unwrap();

        let user = db.users().get(&owner.id).await.unwrap();
        assert!(user.email_verified);
        assert_eq!(user.password_hash, "new-hash");
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let (db, _, _) = setup().await;
        assert!(db.users().mark_verified("missing").await.is_err());
    }
}
