use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::UserId;

/// Stored password credential. One row per user; replaced in place on
/// reset or update, never expired.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Password {
    pub id: Uuid,
    pub user_id: UserId,
    pub password_hash: String,
    pub last_updated: DateTime<Utc>,
}
