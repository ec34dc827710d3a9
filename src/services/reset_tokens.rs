//! Password-reset token lifecycle.
//!
//! A reset token is a 20-character opaque string mailed to the user. One
//! live token per user; reissuing replaces the previous one. Tokens are
//! single use and expire 15 minutes after issuance.

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::reset_token::ResetToken;
use crate::repositories::ResetTokenRepository;
use crate::services::token_codec::generate_reset_token;
use crate::types::UserId;

pub const RESET_TOKEN_VALIDITY: Duration = Duration::minutes(15);

pub struct ResetTokenService {
    reset_tokens: Arc<dyn ResetTokenRepository>,
}

impl ResetTokenService {
    pub fn new(reset_tokens: Arc<dyn ResetTokenRepository>) -> Self {
        Self { reset_tokens }
    }

    /// Issues a fresh token for the user, replacing any previous one.
    pub async fn create_reset_token(&self, user_id: UserId) -> Result<String, AppError> {
        let token = generate_reset_token();
        let record = self
            .reset_tokens
            .upsert(user_id, &token, Utc::now() + RESET_TOKEN_VALIDITY)
            .await?;
        Ok(record.token)
    }

    /// Resolves a submitted token to its row. Unknown and expired tokens
    /// fail the same way so the caller learns nothing about which it was.
    pub async fn find_valid(&self, submitted: &str) -> Result<ResetToken, AppError> {
        let record = self
            .reset_tokens
            .find_by_token(submitted)
            .await?
            .ok_or(AppError::ResetTokenInvalid)?;

        if record.is_expired(Utc::now()) {
            return Err(AppError::ResetTokenInvalid);
        }
        Ok(record)
    }

    /// Consumes the user's token after a successful reset.
    pub async fn delete_user_reset_tokens(&self, user_id: UserId) -> Result<(), AppError> {
        self.reset_tokens.delete_by_user(user_id).await
    }
}
