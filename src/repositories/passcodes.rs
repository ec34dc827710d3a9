//! Passcode repository. One live row per user; reissuing a passcode
//! overwrites the existing row with a new code and expiry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::passcode::Passcode;
use crate::types::UserId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasscodeRepository: Send + Sync {
    async fn upsert(
        &self,
        user_id: UserId,
        passcode: &str,
        expiry_date: DateTime<Utc>,
    ) -> Result<Passcode, AppError>;

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Passcode>, AppError>;

    async fn delete_by_user(&self, user_id: UserId) -> Result<(), AppError>;

    /// Removes rows whose expiry is in the past, returning the count.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

pub struct PgPasscodeRepository {
    pool: PgPool,
}

impl PgPasscodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasscodeRepository for PgPasscodeRepository {
    async fn upsert(
        &self,
        user_id: UserId,
        passcode: &str,
        expiry_date: DateTime<Utc>,
    ) -> Result<Passcode, AppError> {
        let record = sqlx::query_as::<_, Passcode>(
            r#"
            INSERT INTO passcodes (id, user_id, passcode, expiry_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id)
            DO UPDATE SET passcode = EXCLUDED.passcode, expiry_date = EXCLUDED.expiry_date
            RETURNING id, user_id, passcode, expiry_date
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(passcode)
        .bind(expiry_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Passcode>, AppError> {
        let record = sqlx::query_as::<_, Passcode>(
            r#"
            SELECT id, user_id, passcode, expiry_date
            FROM passcodes
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete_by_user(&self, user_id: UserId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM passcodes WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM passcodes WHERE expiry_date < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
