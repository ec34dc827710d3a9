use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::UserId;

/// One-time email verification passcode. One row per user, recreated with a
/// fresh code and expiry on every reset; deleted on successful verification
/// or by the sweeper.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Passcode {
    pub id: Uuid,
    pub user_id: UserId,
    pub passcode: String,
    pub expiry_date: DateTime<Utc>,
}

impl Passcode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date < now
    }
}
