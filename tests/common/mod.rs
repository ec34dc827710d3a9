//! In-memory wiring for driving the router without Postgres, the profile
//! service or an SMTP relay.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

use identity_service::clients::UserProfileClient;
use identity_service::config::Config;
use identity_service::error::AppError;
use identity_service::models::auth::{AuthDetails, UserProfile, UserStatus};
use identity_service::models::passcode::Passcode;
use identity_service::models::password::Password;
use identity_service::models::refresh_token::RefreshToken;
use identity_service::models::reset_token::ResetToken;
use identity_service::notifications::{
    NotificationProducer, ResetPasswordEmail, VerificationEmail, WelcomeEmail,
};
use identity_service::repositories::{
    PasscodeRepository, PasswordRepository, RefreshTokenRepository, ResetTokenRepository,
};
use identity_service::routes::build_router;
use identity_service::state::AppState;
use identity_service::types::{RefreshTokenId, UserId};

#[derive(Default)]
pub struct InMemoryPasswords {
    rows: Mutex<HashMap<UserId, Password>>,
}

#[async_trait]
impl PasswordRepository for InMemoryPasswords {
    async fn upsert(&self, user_id: UserId, password_hash: &str) -> Result<Password, AppError> {
        let record = Password {
            id: Uuid::new_v4(),
            user_id,
            password_hash: password_hash.to_string(),
            last_updated: Utc::now(),
        };
        self.rows.lock().unwrap().insert(user_id, record.clone());
        Ok(record)
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Password>, AppError> {
        Ok(self.rows.lock().unwrap().get(&user_id).cloned())
    }

    async fn delete_by_user(&self, user_id: UserId) -> Result<(), AppError> {
        self.rows.lock().unwrap().remove(&user_id);
        Ok(())
    }
}

impl InMemoryPasswords {
    pub fn contains(&self, user_id: UserId) -> bool {
        self.rows.lock().unwrap().contains_key(&user_id)
    }
}

#[derive(Default)]
pub struct InMemoryPasscodes {
    rows: Mutex<HashMap<UserId, Passcode>>,
}

#[async_trait]
impl PasscodeRepository for InMemoryPasscodes {
    async fn upsert(
        &self,
        user_id: UserId,
        passcode: &str,
        expiry_date: DateTime<Utc>,
    ) -> Result<Passcode, AppError> {
        let record = Passcode {
            id: Uuid::new_v4(),
            user_id,
            passcode: passcode.to_string(),
            expiry_date,
        };
        self.rows.lock().unwrap().insert(user_id, record.clone());
        Ok(record)
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Passcode>, AppError> {
        Ok(self.rows.lock().unwrap().get(&user_id).cloned())
    }

    async fn delete_by_user(&self, user_id: UserId) -> Result<(), AppError> {
        self.rows.lock().unwrap().remove(&user_id);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|_, record| record.expiry_date >= now);
        Ok((before - rows.len()) as u64)
    }
}

impl InMemoryPasscodes {
    pub fn current(&self, user_id: UserId) -> Option<String> {
        self.rows
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|record| record.passcode.clone())
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.rows.lock().unwrap().contains_key(&user_id)
    }

    pub fn expire(&self, user_id: UserId) {
        if let Some(record) = self.rows.lock().unwrap().get_mut(&user_id) {
            record.expiry_date = Utc::now() - chrono::Duration::seconds(5);
        }
    }
}

#[derive(Default)]
pub struct InMemoryResetTokens {
    rows: Mutex<HashMap<UserId, ResetToken>>,
}

#[async_trait]
impl ResetTokenRepository for InMemoryResetTokens {
    async fn upsert(
        &self,
        user_id: UserId,
        token: &str,
        expiry_date: DateTime<Utc>,
    ) -> Result<ResetToken, AppError> {
        let record = ResetToken {
            id: Uuid::new_v4(),
            user_id,
            token: token.to_string(),
            expiry_date,
        };
        self.rows.lock().unwrap().insert(user_id, record.clone());
        Ok(record)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ResetToken>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|record| record.token == token)
            .cloned())
    }

    async fn delete_by_user(&self, user_id: UserId) -> Result<(), AppError> {
        self.rows.lock().unwrap().remove(&user_id);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|_, record| record.expiry_date >= now);
        Ok((before - rows.len()) as u64)
    }
}

impl InMemoryResetTokens {
    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.rows.lock().unwrap().contains_key(&user_id)
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokens {
    rows: Mutex<HashMap<RefreshTokenId, RefreshToken>>,
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokens {
    async fn create(
        &self,
        id: RefreshTokenId,
        user_id: UserId,
        expiry_date: DateTime<Utc>,
    ) -> Result<RefreshToken, AppError> {
        let record = RefreshToken {
            id,
            user_id,
            expiry_date,
        };
        self.rows.lock().unwrap().insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_id_and_user(
        &self,
        id: RefreshTokenId,
        user_id: UserId,
    ) -> Result<Option<RefreshToken>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&id)
            .filter(|record| record.user_id == user_id)
            .cloned())
    }

    async fn delete_by_id(&self, id: RefreshTokenId) -> Result<(), AppError> {
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn delete_by_user(&self, user_id: UserId) -> Result<(), AppError> {
        self.rows
            .lock()
            .unwrap()
            .retain(|_, record| record.user_id != user_id);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|_, record| record.expiry_date >= now);
        Ok((before - rows.len()) as u64)
    }
}

impl InMemoryRefreshTokens {
    pub fn count_for(&self, user_id: UserId) -> usize {
        self.rows
            .lock()
            .unwrap()
            .values()
            .filter(|record| record.user_id == user_id)
            .count()
    }
}

#[derive(Default)]
pub struct StubUserProfiles {
    details: Mutex<HashMap<UserId, AuthDetails>>,
    profiles: Mutex<HashMap<UserId, UserProfile>>,
    verified: Mutex<Vec<UserId>>,
}

impl StubUserProfiles {
    pub fn seed(&self, user_id: UserId, email: &str, first_name: &str, status: UserStatus) {
        self.details.lock().unwrap().insert(
            user_id,
            AuthDetails {
                user_id,
                roles: vec!["USER".to_string()],
                authorities: vec!["READ".to_string()],
                status,
            },
        );
        self.profiles.lock().unwrap().insert(
            user_id,
            UserProfile {
                first_name: first_name.to_string(),
                last_name: "Tester".to_string(),
                email: email.to_string(),
            },
        );
    }

    pub fn verified_users(&self) -> Vec<UserId> {
        self.verified.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserProfileClient for StubUserProfiles {
    async fn get_auth_details_by_email(&self, email: &str) -> Result<AuthDetails, AppError> {
        let user_id = {
            let profiles = self.profiles.lock().unwrap();
            profiles
                .iter()
                .find(|(_, profile)| profile.email == email)
                .map(|(user_id, _)| *user_id)
        }
        .ok_or_else(|| AppError::NotFound("auth details not found".to_string()))?;
        self.get_auth_details_by_user_id(user_id).await
    }

    async fn get_auth_details_by_user_id(&self, user_id: UserId) -> Result<AuthDetails, AppError> {
        self.details
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("auth details not found".to_string()))
    }

    async fn get_user(&self, user_id: UserId) -> Result<UserProfile, AppError> {
        self.profiles
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("user profile not found".to_string()))
    }

    async fn verify_user_email(&self, user_id: UserId) -> Result<(), AppError> {
        self.verified.lock().unwrap().push(user_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifications {
    pub verifications: Mutex<Vec<VerificationEmail>>,
    pub welcomes: Mutex<Vec<WelcomeEmail>>,
    pub resets: Mutex<Vec<ResetPasswordEmail>>,
}

#[async_trait]
impl NotificationProducer for RecordingNotifications {
    async fn send_verification_email(&self, message: &VerificationEmail) -> Result<(), AppError> {
        self.verifications.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn send_welcome_email(&self, message: &WelcomeEmail) -> Result<(), AppError> {
        self.welcomes.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn send_reset_password_email(
        &self,
        message: &ResetPasswordEmail,
    ) -> Result<(), AppError> {
        self.resets.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub profiles: Arc<StubUserProfiles>,
    pub notifications: Arc<RecordingNotifications>,
    pub passwords: Arc<InMemoryPasswords>,
    pub passcodes: Arc<InMemoryPasscodes>,
    pub reset_tokens: Arc<InMemoryResetTokens>,
    pub refresh_tokens: Arc<InMemoryRefreshTokens>,
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/identity_test".to_string(),
        access_token_secret: "test-access-secret".to_string(),
        refresh_token_secret: "test-refresh-secret".to_string(),
        environment: "test".to_string(),
        user_service_url: "http://users:8080".to_string(),
        upstream_timeout_seconds: 1,
        rate_limit_ip_max_requests: 100,
        rate_limit_ip_window_seconds: 60,
        sweep_interval_seconds: 300,
    }
}

pub fn spawn_app() -> TestApp {
    let profiles = Arc::new(StubUserProfiles::default());
    let notifications = Arc::new(RecordingNotifications::default());
    let passwords = Arc::new(InMemoryPasswords::default());
    let passcodes = Arc::new(InMemoryPasscodes::default());
    let reset_tokens = Arc::new(InMemoryResetTokens::default());
    let refresh_tokens = Arc::new(InMemoryRefreshTokens::default());

    let state = AppState::from_parts(
        test_config(),
        profiles.clone(),
        notifications.clone(),
        passwords.clone(),
        passcodes.clone(),
        reset_tokens.clone(),
        refresh_tokens.clone(),
    );

    TestApp {
        router: build_router(state),
        profiles,
        notifications,
        passwords,
        passcodes,
        reset_tokens,
        refresh_tokens,
    }
}

impl TestApp {
    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("route request")
    }

    pub async fn json(
        &self,
        method: &str,
        path: &str,
        body: serde_json::Value,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder
            .body(Body::from(body.to_string()))
            .expect("build request");
        self.request(request).await
    }
}

pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    use http_body_util::BodyExt;
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse json body")
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().expect("cookie header").to_string())
        .collect()
}

/// Turns `Set-Cookie` values into a `Cookie` request header.
pub fn cookie_header(set_cookies: &[String]) -> String {
    set_cookies
        .iter()
        .map(|cookie| cookie.split(';').next().unwrap_or_default())
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
