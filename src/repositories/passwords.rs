//! Password credential repository.
//!
//! "Create" is an upsert keyed by the unique `user_id`: a single
//! `INSERT .. ON CONFLICT` statement so replacement is atomic.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::password::Password;
use crate::types::UserId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordRepository: Send + Sync {
    /// Inserts or replaces the stored hash for a user.
    async fn upsert(&self, user_id: UserId, password_hash: &str) -> Result<Password, AppError>;

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Password>, AppError>;

    async fn delete_by_user(&self, user_id: UserId) -> Result<(), AppError>;
}

pub struct PgPasswordRepository {
    pool: PgPool,
}

impl PgPasswordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordRepository for PgPasswordRepository {
    async fn upsert(&self, user_id: UserId, password_hash: &str) -> Result<Password, AppError> {
        let record = sqlx::query_as::<_, Password>(
            r#"
            INSERT INTO passwords (id, user_id, password_hash, last_updated)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET password_hash = EXCLUDED.password_hash, last_updated = NOW()
            RETURNING id, user_id, password_hash, last_updated
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Password>, AppError> {
        let record = sqlx::query_as::<_, Password>(
            r#"
            SELECT id, user_id, password_hash, last_updated
            FROM passwords
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete_by_user(&self, user_id: UserId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM passwords WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
