//! # Verification Code Repository
//!
//! One-time codes for signup confirmation and password reset.
//!
//! ## Lifecycle
//! ```text
//! issue(email, purpose)     older unconsumed codes for the same
//!      │                    email + purpose are marked consumed
//!      ▼
//! ┌──────────────┐  consume(code) before expiry   ┌────────────┐
//! │  outstanding │ ─────────────────────────────► │  consumed  │
//! └──────────────┘                                └────────────┘
//!      │ expires_at passes
//!      ▼
//! consume(code) → CodeExpired
//! ```
//!
//! The consuming UPDATE only matches an unconsumed row, so a code is
//! accepted at most once even under concurrent requests.

use biztrack_core::codes::normalize_code;
use biztrack_core::{CoreError, VerificationCode, VerificationPurpose};
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::new_id;
use crate::error::DbResult;

const SELECT_CODE: &str = "SELECT id, email, code, purpose, expires_at, consumed_at, created_at \
     FROM verification_codes";

#[derive(Debug, Clone)]
pub struct VerificationRepository {
    pool: SqlitePool,
}

impl VerificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VerificationRepository { pool }
    }

    /// Stores a freshly generated code and invalidates older ones.
    pub async fn issue(
        &self,
        email: &str,
        purpose: VerificationPurpose,
        code: &str,
        ttl: Duration,
    ) -> DbResult<VerificationCode> {
        let now = Utc::now();
        let record = VerificationCode {
            id: new_id(),
            email: email.trim().to_lowercase(),
            code: normalize_code(code),
            purpose,
            expires_at: now + ttl,
            consumed_at: None,
            created_at: now,
        };

        let mut tx = self.pool.begin().await?;

        let invalidated = sqlx::query(
            "UPDATE verification_codes SET consumed_at = ?1
             WHERE email = ?2 AND purpose = ?3 AND consumed_at IS NULL",
        )
        .bind(now)
        .bind(&record.email)
        .bind(purpose)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            "INSERT INTO verification_codes (id, email, code, purpose, expires_at, consumed_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6)",
        )
        .bind(&record.id)
        .bind(&record.email)
        .bind(&record.code)
        .bind(record.purpose)
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(email = %record.email, ?purpose, invalidated, "Verification code issued");
        Ok(record)
    }

    /// Consumes a matching outstanding code.
    ///
    /// ## Errors
    /// - `CoreError::InvalidCode` when no outstanding code matches
    /// - `CoreError::CodeExpired` when it matched but is past `expires_at`
    pub async fn consume(
        &self,
        email: &str,
        purpose: VerificationPurpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> DbResult<VerificationCode> {
        let email = email.trim().to_lowercase();
        let code = normalize_code(code);

        let sql = format!(
            "{SELECT_CODE} WHERE email = ?1 AND purpose = ?2 AND code = ?3 \
             AND consumed_at IS NULL ORDER BY created_at DESC LIMIT 1"
        );
        let mut record = sqlx::query_as::<_, VerificationCode>(&sql)
            .bind(&email)
            .bind(purpose)
            .bind(&code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(CoreError::InvalidCode)?;

        if record.is_expired(now) {
            return Err(CoreError::CodeExpired.into());
        }

        // Only one caller may flip consumed_at; a racing consume sees 0 rows.
        let claimed = sqlx::query(
            "UPDATE verification_codes SET consumed_at = ?1
             WHERE id = ?2 AND consumed_at IS NULL",
        )
        .bind(now)
        .bind(&record.id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        if claimed == 0 {
            return Err(CoreError::InvalidCode.into());
        }

        record.consumed_at = Some(now);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};

    async fn repo() -> VerificationRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.verification_codes()
    }

    #[tokio::test]
    async fn test_issue_then_consume() {
        let repo = repo().await;
        repo.issue("a@b.co", VerificationPurpose::Signup, "ABC123", Duration::minutes(10))
            .await
            .unwrap();

        let consumed = repo
            .consume("A@B.co", VerificationPurpose::Signup, "abc123", Utc::now())
            .await
            .unwrap();
        assert!(consumed.is_consumed());

        // Single use.
        let again = repo
            .consume("a@b.co", VerificationPurpose::Signup, "ABC123", Utc::now())
            .await;
        assert!(matches!(again, Err(DbError::Rule(CoreError::InvalidCode))));
    }

    #[tokio::test]
    async fn test_concurrent_consumes_succeed_once() {
        let repo = repo().await;
        repo.issue("a@b.co", VerificationPurpose::Signup, "RACE01", Duration::minutes(10))
            .await
            .unwrap();

        let now = Utc::now();
        let (first, second) = tokio::join!(
            repo.consume("a@b.co", VerificationPurpose::Signup, "RACE01", now),
            repo.consume("a@b.co", VerificationPurpose::Signup, "RACE01", now),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(DbError::Rule(CoreError::InvalidCode)))));
    }

    #[tokio::test]
    async fn test_new_code_invalidates_old() {
        let repo = repo().await;
        repo.issue("a@b.co", VerificationPurpose::Signup, "OLD111", Duration::minutes(10))
            .await
            .unwrap();
        repo.issue("a@b.co", VerificationPurpose::Signup, "NEW222", Duration::minutes(10))
            .await
            .unwrap();

        let old = repo
            .consume("a@b.co", VerificationPurpose::Signup, "OLD111", Utc::now())
            .await;
        assert!(matches!(old, Err(DbError::Rule(CoreError::InvalidCode))));

        repo.consume("a@b.co", VerificationPurpose::Signup, "NEW222", Utc::now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expired_code() {
        let repo = repo().await;
        repo.issue("a@b.co", VerificationPurpose::PasswordReset, "ZZZ999", Duration::minutes(10))
            .await
            .unwrap();

        let later = Utc::now() + Duration::minutes(11);
        let result = repo
            .consume("a@b.co", VerificationPurpose::PasswordReset, "ZZZ999", later)
            .await;
        assert!(matches!(result, Err(DbError::Rule(CoreError::CodeExpired))));
    }

    #[tokio::test]
    async fn test_purposes_are_separate() {
        let repo = repo().await;
        repo.issue("a@b.co", VerificationPurpose::Signup, "SIGN01", Duration::minutes(10))
            .await
            .unwrap();

        let result = repo
            .consume("a@b.co", VerificationPurpose::PasswordReset, "SIGN01", Utc::now())
            .await;
        assert!(result.is_err());
    }
}
