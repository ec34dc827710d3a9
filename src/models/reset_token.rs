use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::UserId;

/// Opaque password-reset bearer token. One row per user, recreated on each
/// forgot-password request and deleted once consumed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResetToken {
    pub id: Uuid,
    pub user_id: UserId,
    pub token: String,
    pub expiry_date: DateTime<Utc>,
}

impl ResetToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date < now
    }
}
