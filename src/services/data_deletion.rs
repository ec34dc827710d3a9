//! Account data teardown for right-to-erasure requests.

use std::sync::Arc;

use crate::error::AppError;
use crate::repositories::{
    PasscodeRepository, PasswordRepository, RefreshTokenRepository, ResetTokenRepository,
};
use crate::types::UserId;

pub struct DataDeletionService {
    passwords: Arc<dyn PasswordRepository>,
    passcodes: Arc<dyn PasscodeRepository>,
    reset_tokens: Arc<dyn ResetTokenRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

impl DataDeletionService {
    pub fn new(
        passwords: Arc<dyn PasswordRepository>,
        passcodes: Arc<dyn PasscodeRepository>,
        reset_tokens: Arc<dyn ResetTokenRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
    ) -> Self {
        Self {
            passwords,
            passcodes,
            reset_tokens,
            refresh_tokens,
        }
    }

    /// Removes every credential artifact the service holds for a user.
    ///
    /// All four stores are attempted even when an earlier one fails, then
    /// the first failure is reported. Deleting a user with no rows is a
    /// no-op, so the operation is safe to retry.
    pub async fn delete_user_data(&self, user_id: UserId) -> Result<(), AppError> {
        tracing::info!(user_id = %user_id, "Deleting all identity data for user");

        let results = [
            self.passwords.delete_by_user(user_id).await,
            self.passcodes.delete_by_user(user_id).await,
            self.reset_tokens.delete_by_user(user_id).await,
            self.refresh_tokens.delete_by_user(user_id).await,
        ];
        results.into_iter().collect()
    }
}
