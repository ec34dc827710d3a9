use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{RefreshTokenId, UserId};

/// Server-side session record backing a signed refresh token. The row id is
/// embedded in the signed token as the `token_id` claim; a signed token with
/// no matching row is treated as reuse of a rotated-out credential.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    pub id: RefreshTokenId,
    pub user_id: UserId,
    pub expiry_date: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date < now
    }
}
