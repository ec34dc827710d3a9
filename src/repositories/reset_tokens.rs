//! Reset-token repository. Looked up by the opaque token string (indexed)
//! when a reset is submitted, and by user id for reissue and teardown.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::reset_token::ResetToken;
use crate::types::UserId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResetTokenRepository: Send + Sync {
    async fn upsert(
        &self,
        user_id: UserId,
        token: &str,
        expiry_date: DateTime<Utc>,
    ) -> Result<ResetToken, AppError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<ResetToken>, AppError>;

    async fn delete_by_user(&self, user_id: UserId) -> Result<(), AppError>;

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

pub struct PgResetTokenRepository {
    pool: PgPool,
}

impl PgResetTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetTokenRepository for PgResetTokenRepository {
    async fn upsert(
        &self,
        user_id: UserId,
        token: &str,
        expiry_date: DateTime<Utc>,
    ) -> Result<ResetToken, AppError> {
        let record = sqlx::query_as::<_, ResetToken>(
            r#"
            INSERT INTO reset_tokens (id, user_id, token, expiry_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id)
            DO UPDATE SET token = EXCLUDED.token, expiry_date = EXCLUDED.expiry_date
            RETURNING id, user_id, token, expiry_date
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token)
        .bind(expiry_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ResetToken>, AppError> {
        let record = sqlx::query_as::<_, ResetToken>(
            r#"
            SELECT id, user_id, token, expiry_date
            FROM reset_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete_by_user(&self, user_id: UserId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM reset_tokens WHERE expiry_date < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
