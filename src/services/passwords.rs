//! Password credential flows: storage, verification, forgot/reset, update.

use std::sync::Arc;

use crate::clients::UserProfileClient;
use crate::error::AppError;
use crate::notifications::{NotificationProducer, ResetPasswordEmail};
use crate::repositories::PasswordRepository;
use crate::services::reset_tokens::ResetTokenService;
use crate::types::UserId;
use crate::utils::password::{hash_password, verify_password};

pub struct PasswordService {
    passwords: Arc<dyn PasswordRepository>,
    reset_tokens: Arc<ResetTokenService>,
    user_profiles: Arc<dyn UserProfileClient>,
    notifications: Arc<dyn NotificationProducer>,
}

impl PasswordService {
    pub fn new(
        passwords: Arc<dyn PasswordRepository>,
        reset_tokens: Arc<ResetTokenService>,
        user_profiles: Arc<dyn UserProfileClient>,
        notifications: Arc<dyn NotificationProducer>,
    ) -> Self {
        Self {
            passwords,
            reset_tokens,
            user_profiles,
            notifications,
        }
    }

    /// Hashes and stores a password, replacing any existing one.
    pub async fn create_password(&self, user_id: UserId, password: &str) -> Result<(), AppError> {
        let hash = hash_password(password)?;
        self.passwords.upsert(user_id, &hash).await?;
        Ok(())
    }

    /// Checks a password against the stored hash. A user with no stored
    /// password is a 404; a wrong password is an invalid-credentials 401.
    pub async fn verify_user_password(
        &self,
        user_id: UserId,
        password: &str,
    ) -> Result<(), AppError> {
        let record = self
            .passwords
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("password not found".to_string()))?;

        if !verify_password(password, &record.password_hash)? {
            return Err(AppError::CredentialsInvalid);
        }
        Ok(())
    }

    /// Issues a reset token and mails it to the account's address. Delivery
    /// failure fails the request since the token is unreachable otherwise.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let details = self.user_profiles.get_auth_details_by_email(email).await?;
        if details.status.is_restricted() {
            return Err(AppError::AccountSuspended(
                details.status.as_str().to_string(),
            ));
        }
        let profile = self.user_profiles.get_user(details.user_id).await?;
        let token = self.reset_tokens.create_reset_token(details.user_id).await?;

        self.notifications
            .send_reset_password_email(&ResetPasswordEmail::new(
                profile.first_name,
                profile.email,
                token,
            ))
            .await
    }

    /// Redeems a reset token: stores the new password, then consumes the
    /// token so it cannot be replayed.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        let record = self.reset_tokens.find_valid(token).await?;
        self.create_password(record.user_id, new_password).await?;
        self.reset_tokens
            .delete_user_reset_tokens(record.user_id)
            .await
    }

    /// Rotates the password for an authenticated user after re-checking the
    /// current one.
    pub async fn update_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        self.verify_user_password(user_id, current_password).await?;
        self.create_password(user_id, new_password).await
    }

    pub async fn delete_user_passwords(&self, user_id: UserId) -> Result<(), AppError> {
        self.passwords.delete_by_user(user_id).await
    }
}
