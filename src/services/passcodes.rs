//! Email-verification passcode lifecycle.
//!
//! A passcode is a 6-character code mailed at signup. Verifying it flips
//! the account out of its pending state via the user-profile service.

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::clients::UserProfileClient;
use crate::error::AppError;
use crate::notifications::{NotificationProducer, VerificationEmail, WelcomeEmail};
use crate::repositories::PasscodeRepository;
use crate::services::token_codec::generate_passcode;
use crate::types::UserId;

pub const PASSCODE_VALIDITY: Duration = Duration::minutes(15);

pub struct PasscodeService {
    passcodes: Arc<dyn PasscodeRepository>,
    user_profiles: Arc<dyn UserProfileClient>,
    notifications: Arc<dyn NotificationProducer>,
}

impl PasscodeService {
    pub fn new(
        passcodes: Arc<dyn PasscodeRepository>,
        user_profiles: Arc<dyn UserProfileClient>,
        notifications: Arc<dyn NotificationProducer>,
    ) -> Self {
        Self {
            passcodes,
            user_profiles,
            notifications,
        }
    }

    /// Issues a fresh passcode for the user, replacing any previous one.
    pub async fn create_passcode(&self, user_id: UserId) -> Result<String, AppError> {
        let passcode = generate_passcode();
        let record = self
            .passcodes
            .upsert(user_id, &passcode, Utc::now() + PASSCODE_VALIDITY)
            .await?;
        Ok(record.passcode)
    }

    /// Reissues the passcode and mails it again. Delivery failure fails the
    /// request since the new code would otherwise be unreachable.
    pub async fn reset_passcode(&self, user_id: UserId) -> Result<(), AppError> {
        let profile = self.user_profiles.get_user(user_id).await?;
        let passcode = self.create_passcode(user_id).await?;
        self.notifications
            .send_verification_email(&VerificationEmail::new(
                profile.first_name,
                profile.email,
                passcode,
            ))
            .await
    }

    /// Checks the submitted code and, on match, marks the email verified
    /// upstream and consumes the passcode row.
    pub async fn verify_passcode(&self, user_id: UserId, submitted: &str) -> Result<(), AppError> {
        let record = self
            .passcodes
            .find_by_user(user_id)
            .await?
            .ok_or(AppError::PasscodeInvalid)?;

        // An expired row stays in place so the user can request a resend.
        if record.is_expired(Utc::now()) {
            return Err(AppError::PasscodeExpired);
        }
        if record.passcode != submitted {
            return Err(AppError::PasscodeInvalid);
        }

        let profile = self.user_profiles.get_user(user_id).await?;
        self.user_profiles.verify_user_email(user_id).await?;
        self.passcodes.delete_by_user(user_id).await?;

        let welcome = WelcomeEmail::new(profile.first_name, profile.email);
        if let Err(err) = self.notifications.send_welcome_email(&welcome).await {
            tracing::warn!(user_id = %user_id, error = %err, "Failed to send welcome email");
        }
        Ok(())
    }

    pub async fn delete_user_passcodes(&self, user_id: UserId) -> Result<(), AppError> {
        self.passcodes.delete_by_user(user_id).await
    }
}
