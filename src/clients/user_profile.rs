//! HTTP client for the user-profile service.
//!
//! Transport failures and upstream error bodies never escape this module:
//! a 404-class miss becomes `AppError::NotFound` (translated further by the
//! calling flow) and everything else becomes `AppError::UpstreamUnavailable`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use crate::error::AppError;
use crate::models::auth::{AuthDetails, UserProfile, UserStatus};
use crate::types::UserId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileClient: Send + Sync {
    async fn get_auth_details_by_email(&self, email: &str) -> Result<AuthDetails, AppError>;

    async fn get_auth_details_by_user_id(&self, user_id: UserId) -> Result<AuthDetails, AppError>;

    async fn get_user(&self, user_id: UserId) -> Result<UserProfile, AppError>;

    /// Marks the user's email address as verified.
    async fn verify_user_email(&self, user_id: UserId) -> Result<(), AppError>;
}

/// Wire representation of auth details; the profile service speaks camelCase.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthDetailsDto {
    user_id: UserId,
    roles: Vec<String>,
    authorities: Vec<String>,
    status: UserStatus,
}

impl From<AuthDetailsDto> for AuthDetails {
    fn from(dto: AuthDetailsDto) -> Self {
        AuthDetails {
            user_id: dto.user_id,
            roles: dto.roles,
            authorities: dto.authorities,
            status: dto.status,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserProfileDto {
    first_name: String,
    last_name: String,
    email: String,
}

impl From<UserProfileDto> for UserProfile {
    fn from(dto: UserProfileDto) -> Self {
        UserProfile {
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email,
        }
    }
}

pub struct HttpUserProfileClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserProfileClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        context: &str,
    ) -> Result<T, AppError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(context, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(AppError::NotFound(format!("{} not found", context))),
            status if status.is_success() => response
                .json::<T>()
                .await
                .map_err(|e| transport_error(context, e)),
            status => Err(status_error(context, status)),
        }
    }
}

fn transport_error(context: &str, err: reqwest::Error) -> AppError {
    AppError::UpstreamUnavailable(format!("{}: {}", context, err))
}

fn status_error(context: &str, status: StatusCode) -> AppError {
    AppError::UpstreamUnavailable(format!("{}: upstream returned {}", context, status))
}

#[async_trait]
impl UserProfileClient for HttpUserProfileClient {
    async fn get_auth_details_by_email(&self, email: &str) -> Result<AuthDetails, AppError> {
        let url = format!(
            "{}/user/auth-details/by-email?email={}",
            self.base_url, email
        );
        let dto: AuthDetailsDto = self.get_json(url, "auth details").await?;
        Ok(dto.into())
    }

    async fn get_auth_details_by_user_id(&self, user_id: UserId) -> Result<AuthDetails, AppError> {
        let url = format!(
            "{}/user/auth-details/by-userid?userId={}",
            self.base_url, user_id
        );
        let dto: AuthDetailsDto = self.get_json(url, "auth details").await?;
        Ok(dto.into())
    }

    async fn get_user(&self, user_id: UserId) -> Result<UserProfile, AppError> {
        let url = format!("{}/user/{}", self.base_url, user_id);
        let dto: UserProfileDto = self.get_json(url, "user profile").await?;
        Ok(dto.into())
    }

    async fn verify_user_email(&self, user_id: UserId) -> Result<(), AppError> {
        let context = "email verification";
        let url = format!("{}/user/{}/verify", self.base_url, user_id);
        let response = self
            .client
            .patch(&url)
            .send()
            .await
            .map_err(|e| transport_error(context, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(AppError::NotFound("user not found".to_string())),
            status if status.is_success() => Ok(()),
            status => Err(status_error(context, status)),
        }
    }
}
