//! Auth-details snapshot types and request payloads for the identity flows.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::UserId;

/// Account status as reported by the user-profile service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Pending,
    Active,
    Suspended,
    Locked,
    Inactive,
}

impl UserStatus {
    /// Statuses that fail closed before any credential check.
    pub fn is_restricted(&self) -> bool {
        matches!(
            self,
            UserStatus::Suspended | UserStatus::Locked | UserStatus::Inactive
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "PENDING",
            UserStatus::Active => "ACTIVE",
            UserStatus::Suspended => "SUSPENDED",
            UserStatus::Locked => "LOCKED",
            UserStatus::Inactive => "INACTIVE",
        }
    }
}

/// Point-in-time authorization snapshot fetched from the user-profile
/// service at token issuance. Not re-checked until the next refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthDetails {
    pub user_id: UserId,
    pub roles: Vec<String>,
    pub authorities: Vec<String>,
    pub status: UserStatus,
}

/// Personalization fields for outbound notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub user_id: UserId,
    #[validate(length(min = 1, message = "firstName cannot be blank"))]
    pub first_name: String,
    #[validate(email(message = "email should be valid"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email should be valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "password cannot be blank"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyPasscodeRequest {
    #[validate(length(equal = 6, message = "passcode must be 6 characters"))]
    pub passcode: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPasswordRequest {
    pub user_id: UserId,
    #[validate(length(min = 1, message = "password cannot be blank"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "email should be valid"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(equal = 20, message = "resetToken must be 20 characters"))]
    pub reset_token: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "currentPassword cannot be blank"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "newPassword must be at least 8 characters"))]
    pub new_password: String,
}
