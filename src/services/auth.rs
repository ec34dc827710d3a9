//! Session flows: credential onboarding, login, refresh rotation, logout.

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::clients::UserProfileClient;
use crate::error::AppError;
use crate::models::auth::{AuthDetails, CredentialsRequest, LoginRequest};
use crate::notifications::{NotificationProducer, VerificationEmail};
use crate::repositories::RefreshTokenRepository;
use crate::services::passcodes::PasscodeService;
use crate::services::passwords::PasswordService;
use crate::services::session_tokens::{
    refresh_token_id, subject_user_id, SessionTokenService, REFRESH_TOKEN_VALIDITY,
};
use crate::types::{RefreshTokenId, UserId};

pub struct AuthService {
    user_profiles: Arc<dyn UserProfileClient>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    session_tokens: Arc<SessionTokenService>,
    passwords: Arc<PasswordService>,
    passcodes: Arc<PasscodeService>,
    notifications: Arc<dyn NotificationProducer>,
}

impl AuthService {
    pub fn new(
        user_profiles: Arc<dyn UserProfileClient>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        session_tokens: Arc<SessionTokenService>,
        passwords: Arc<PasswordService>,
        passcodes: Arc<PasscodeService>,
        notifications: Arc<dyn NotificationProducer>,
    ) -> Self {
        Self {
            user_profiles,
            refresh_tokens,
            session_tokens,
            passwords,
            passcodes,
            notifications,
        }
    }

    /// Stores the initial password and issues a verification passcode for a
    /// newly registered user. The verification email is best effort; the
    /// user can always request a resend.
    pub async fn create_credentials(&self, request: &CredentialsRequest) -> Result<(), AppError> {
        self.passwords
            .create_password(request.user_id, &request.password)
            .await?;
        let passcode = self.passcodes.create_passcode(request.user_id).await?;

        let message = VerificationEmail::new(
            request.first_name.clone(),
            request.email.clone(),
            passcode,
        );
        if let Err(err) = self.notifications.send_verification_email(&message).await {
            tracing::warn!(
                user_id = %request.user_id,
                error = %err,
                "Failed to send verification email"
            );
        }
        Ok(())
    }

    /// Authenticates by email and password and opens a new session.
    ///
    /// An unknown email and a wrong password produce the same failure, and
    /// account-status gating runs before the password check so a suspended
    /// account cannot be used as a password oracle.
    pub async fn login(&self, request: &LoginRequest) -> Result<[String; 2], AppError> {
        let details = self
            .user_profiles
            .get_auth_details_by_email(&request.email)
            .await
            .map_err(hide_missing_account)?;

        if details.status.is_restricted() {
            return Err(AppError::AccountSuspended(details.status.as_str().to_string()));
        }

        self.passwords
            .verify_user_password(details.user_id, &request.password)
            .await
            .map_err(hide_missing_account)?;

        self.issue_session(&details).await
    }

    /// Rotates a session: validates the presented refresh token, issues a
    /// replacement with a fresh authorization snapshot, then retires the old
    /// row. The new session exists before the old one is removed so a crash
    /// in between never strands the user without a valid token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<[String; 2], AppError> {
        let claims = self.session_tokens.validate_refresh_token(refresh_token).await?;
        let old_token_id = refresh_token_id(&claims)?;
        let user_id = subject_user_id(&claims.sub)?;

        let details = self
            .user_profiles
            .get_auth_details_by_user_id(user_id)
            .await
            .map_err(|err| match err {
                AppError::NotFound(_) => AppError::SessionExpired,
                other => other,
            })?;

        if details.status.is_restricted() {
            return Err(AppError::AccountSuspended(details.status.as_str().to_string()));
        }

        let cookies = self.issue_session(&details).await?;
        self.refresh_tokens.delete_by_id(old_token_id).await?;
        Ok(cookies)
    }

    /// Retires the presented session row. A missing or undecodable refresh
    /// cookie is not an error; the client is logging out either way.
    pub async fn logout(
        &self,
        user_id: UserId,
        refresh_token: Option<&str>,
    ) -> Result<(), AppError> {
        let Some(token) = refresh_token else {
            return Ok(());
        };
        let Ok(claims) = self.session_tokens.decode_refresh_token(token) else {
            return Ok(());
        };
        let owner_matches = subject_user_id(&claims.sub)
            .map(|subject| subject == user_id)
            .unwrap_or(false);
        if let (true, Ok(token_id)) = (owner_matches, refresh_token_id(&claims)) {
            self.refresh_tokens.delete_by_id(token_id).await?;
        }
        Ok(())
    }

    /// Expired cookie pair for tearing a session down client side.
    pub fn clear_session_cookies(&self) -> [String; 2] {
        self.session_tokens.clear_cookies()
    }

    async fn issue_session(&self, details: &AuthDetails) -> Result<[String; 2], AppError> {
        let token_id = RefreshTokenId::new();
        let expiry = Utc::now() + Duration::seconds(REFRESH_TOKEN_VALIDITY.as_secs() as i64);
        self.refresh_tokens
            .create(token_id, details.user_id, expiry)
            .await?;
        self.session_tokens.auth_cookies(details, token_id)
    }
}

fn hide_missing_account(err: AppError) -> AppError {
    match err {
        AppError::NotFound(_) => AppError::CredentialsInvalid,
        other => other,
    }
}
