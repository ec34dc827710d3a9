//! Refresh-token session rows. Unlike the other credential tables there is
//! one row per issued session, keyed by the token id embedded in the signed
//! refresh token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::refresh_token::RefreshToken;
use crate::types::{RefreshTokenId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Creates a session row with a caller-assigned id. Re-saving an existing
    /// (id, user) pair only moves its expiry forward.
    async fn create(
        &self,
        id: RefreshTokenId,
        user_id: UserId,
        expiry_date: DateTime<Utc>,
    ) -> Result<RefreshToken, AppError>;

    /// Binds a presented token id to its owner.
    async fn find_by_id_and_user(
        &self,
        id: RefreshTokenId,
        user_id: UserId,
    ) -> Result<Option<RefreshToken>, AppError>;

    async fn delete_by_id(&self, id: RefreshTokenId) -> Result<(), AppError>;

    async fn delete_by_user(&self, user_id: UserId) -> Result<(), AppError>;

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn create(
        &self,
        id: RefreshTokenId,
        user_id: UserId,
        expiry_date: DateTime<Utc>,
    ) -> Result<RefreshToken, AppError> {
        let record = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (id, user_id, expiry_date)
            VALUES ($1, $2, $3)
            ON CONFLICT (id)
            DO UPDATE SET expiry_date = EXCLUDED.expiry_date
            RETURNING id, user_id, expiry_date
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(expiry_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_id_and_user(
        &self,
        id: RefreshTokenId,
        user_id: UserId,
    ) -> Result<Option<RefreshToken>, AppError> {
        let record = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT id, user_id, expiry_date
            FROM refresh_tokens
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete_by_id(&self, id: RefreshTokenId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_by_user(&self, user_id: UserId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expiry_date < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
