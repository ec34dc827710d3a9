//! Signed bearer tokens and their binding to server-side session rows.
//!
//! Two token kinds with kind-specific HMAC secrets: a short-lived
//! self-contained access token and a refresh token whose `token_id` claim
//! must match a live `refresh_tokens` row. Every validation failure is
//! surfaced as the same `TokenInvalid` kind so callers cannot tell a bad
//! signature from an expired token from a missing claim.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use crate::config::Config;
use crate::error::AppError;
use crate::models::auth::AuthDetails;
use crate::repositories::RefreshTokenRepository;
use crate::types::{RefreshTokenId, UserId};
use crate::utils::cookies::{
    build_auth_cookie, build_clear_cookie, extract_cookie_value, CookieOptions,
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME,
};

pub const ACCESS_TOKEN_VALIDITY: StdDuration = StdDuration::from_secs(15 * 60);
pub const REFRESH_TOKEN_VALIDITY: StdDuration = StdDuration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Authorization snapshot taken at issuance; not re-checked until refresh.
    pub roles: Vec<String>,
    pub authorities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Id of the backing `refresh_tokens` row.
    pub token_id: String,
}

pub struct SessionTokenService {
    access_secret: String,
    refresh_secret: String,
    cookie_options: CookieOptions,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

impl SessionTokenService {
    pub fn new(
        access_secret: String,
        refresh_secret: String,
        cookie_options: CookieOptions,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
    ) -> Self {
        Self {
            access_secret,
            refresh_secret,
            cookie_options,
            refresh_tokens,
        }
    }

    pub fn from_config(config: &Config, refresh_tokens: Arc<dyn RefreshTokenRepository>) -> Self {
        Self::new(
            config.access_token_secret.clone(),
            config.refresh_token_secret.clone(),
            CookieOptions::for_environment(config.is_production()),
            refresh_tokens,
        )
    }

    pub fn generate_access_token(&self, auth_details: &AuthDetails) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: auth_details.user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::from_std(ACCESS_TOKEN_VALIDITY).expect("fits")).timestamp(),
            roles: auth_details.roles.clone(),
            authorities: auth_details.authorities.clone(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.access_secret.as_ref()),
        )
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("access token signing: {}", e)))
    }

    pub fn generate_refresh_token(
        &self,
        token_id: RefreshTokenId,
        auth_details: &AuthDetails,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: auth_details.user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::from_std(REFRESH_TOKEN_VALIDITY).expect("fits")).timestamp(),
            token_id: token_id.to_string(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.refresh_secret.as_ref()),
        )
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("refresh token signing: {}", e)))
    }

    /// Verifies signature and expiry of an access token. Access tokens are
    /// self-contained and not revocable before natural expiry.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.access_secret.as_ref()),
            &strict_validation(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::TokenInvalid)
    }

    /// Verifies signature and expiry only; the session-row cross-check lives
    /// in [`Self::validate_refresh_token`].
    pub fn decode_refresh_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.refresh_secret.as_ref()),
            &strict_validation(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::TokenInvalid)
    }

    /// Full refresh-token validation: signature + expiry, then the embedded
    /// token id must resolve to a live session row.
    ///
    /// A correctly signed token whose row is gone means a rotated-out or
    /// revoked token is being replayed; every session the subject owns is
    /// revoked before the validation failure is returned.
    pub async fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        let claims = self.decode_refresh_token(token)?;
        let token_id = refresh_token_id(&claims)?;
        let user_id = subject_user_id(&claims.sub)?;

        match self
            .refresh_tokens
            .find_by_id_and_user(token_id, user_id)
            .await?
        {
            None => {
                tracing::warn!(
                    user_id = %user_id,
                    "Refresh token reuse suspected, revoking all sessions"
                );
                self.refresh_tokens.delete_by_user(user_id).await?;
                Err(AppError::TokenInvalid)
            }
            Some(record) if record.is_expired(Utc::now()) => {
                self.refresh_tokens.delete_by_id(token_id).await?;
                Err(AppError::TokenInvalid)
            }
            Some(_) => Ok(claims),
        }
    }

    /// Builds the access + refresh `Set-Cookie` values for a freshly minted
    /// session.
    pub fn auth_cookies(
        &self,
        auth_details: &AuthDetails,
        token_id: RefreshTokenId,
    ) -> Result<[String; 2], AppError> {
        let access_token = self.generate_access_token(auth_details)?;
        let refresh_token = self.generate_refresh_token(token_id, auth_details)?;
        Ok([
            build_auth_cookie(
                ACCESS_COOKIE_NAME,
                &access_token,
                ACCESS_TOKEN_VALIDITY,
                self.cookie_options,
            ),
            build_auth_cookie(
                REFRESH_COOKIE_NAME,
                &refresh_token,
                REFRESH_TOKEN_VALIDITY,
                self.cookie_options,
            ),
        ])
    }

    /// Re-emits both cookies with empty values and `Max-Age=0`.
    pub fn clear_cookies(&self) -> [String; 2] {
        [
            build_clear_cookie(ACCESS_COOKIE_NAME, self.cookie_options),
            build_clear_cookie(REFRESH_COOKIE_NAME, self.cookie_options),
        ]
    }
}

/// Extracts the access token from a `Cookie` header, if present.
pub fn extract_access_token(cookie_header: Option<&str>) -> Option<String> {
    cookie_header.and_then(|header| extract_cookie_value(header, ACCESS_COOKIE_NAME))
}

/// Extracts the refresh token from a `Cookie` header, if present.
pub fn extract_refresh_token(cookie_header: Option<&str>) -> Option<String> {
    cookie_header.and_then(|header| extract_cookie_value(header, REFRESH_COOKIE_NAME))
}

pub fn refresh_token_id(claims: &RefreshClaims) -> Result<RefreshTokenId, AppError> {
    claims.token_id.parse().map_err(|_| AppError::TokenInvalid)
}

pub fn subject_user_id(sub: &str) -> Result<UserId, AppError> {
    sub.parse().map_err(|_| AppError::TokenInvalid)
}

fn strict_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is exact; the default 60s leeway would keep dead tokens alive.
    validation.leeway = 0;
    validation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserStatus;
    use crate::models::refresh_token::RefreshToken;
    use crate::repositories::MockRefreshTokenRepository;

    fn auth_details() -> AuthDetails {
        AuthDetails {
            user_id: UserId::new(),
            roles: vec!["USER".to_string()],
            authorities: vec!["READ".to_string()],
            status: UserStatus::Active,
        }
    }

    fn service_with(repo: MockRefreshTokenRepository) -> SessionTokenService {
        SessionTokenService::new(
            "access-secret".to_string(),
            "refresh-secret".to_string(),
            CookieOptions::for_environment(false),
            Arc::new(repo),
        )
    }

    fn service() -> SessionTokenService {
        service_with(MockRefreshTokenRepository::new())
    }

    #[test]
    fn access_token_round_trips() {
        let svc = service();
        let details = auth_details();
        let token = svc.generate_access_token(&details).expect("generate");
        let claims = svc.validate_access_token(&token).expect("validate");
        assert_eq!(claims.sub, details.user_id.to_string());
        assert_eq!(claims.roles, details.roles);
        assert_eq!(claims.authorities, details.authorities);
    }

    #[test]
    fn kind_specific_secrets_are_not_interchangeable() {
        let svc = service();
        let details = auth_details();
        let refresh = svc
            .generate_refresh_token(RefreshTokenId::new(), &details)
            .expect("generate");
        assert!(matches!(
            svc.validate_access_token(&refresh),
            Err(AppError::TokenInvalid)
        ));

        let access = svc.generate_access_token(&details).expect("generate");
        assert!(matches!(
            svc.decode_refresh_token(&access),
            Err(AppError::TokenInvalid)
        ));
    }

    #[test]
    fn expiry_boundary_is_exact() {
        let svc = service();
        let details = auth_details();
        let now = Utc::now();

        let expired = AccessClaims {
            sub: details.user_id.to_string(),
            iat: now.timestamp() - 900,
            exp: now.timestamp() - 2,
            roles: vec![],
            authorities: vec![],
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &expired,
            &EncodingKey::from_secret("access-secret".as_ref()),
        )
        .expect("encode");
        assert!(matches!(
            svc.validate_access_token(&token),
            Err(AppError::TokenInvalid)
        ));

        let barely_alive = AccessClaims {
            exp: now.timestamp() + 5,
            ..expired
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &barely_alive,
            &EncodingKey::from_secret("access-secret".as_ref()),
        )
        .expect("encode");
        assert!(svc.validate_access_token(&token).is_ok());
    }

    #[test]
    fn malformed_tokens_fail_uniformly() {
        let svc = service();
        assert!(matches!(
            svc.validate_access_token("not-a-jwt"),
            Err(AppError::TokenInvalid)
        ));
        assert!(matches!(
            svc.decode_refresh_token(""),
            Err(AppError::TokenInvalid)
        ));
    }

    #[tokio::test]
    async fn refresh_validation_passes_with_a_live_row() {
        let details = auth_details();
        let token_id = RefreshTokenId::new();
        let user_id = details.user_id;

        let mut repo = MockRefreshTokenRepository::new();
        repo.expect_find_by_id_and_user().returning(|id, user_id| {
            Ok(Some(RefreshToken {
                id,
                user_id,
                expiry_date: Utc::now() + Duration::days(7),
            }))
        });

        let svc = service_with(repo);
        let token = svc
            .generate_refresh_token(token_id, &details)
            .expect("generate");
        let claims = svc.validate_refresh_token(&token).await.expect("validate");
        assert_eq!(refresh_token_id(&claims).unwrap(), token_id);
        assert_eq!(subject_user_id(&claims.sub).unwrap(), user_id);
    }

    #[tokio::test]
    async fn missing_row_revokes_every_session_for_the_subject() {
        let details = auth_details();
        let user_id = details.user_id;

        let mut repo = MockRefreshTokenRepository::new();
        repo.expect_find_by_id_and_user().returning(|_, _| Ok(None));
        repo.expect_delete_by_user()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(|_| Ok(()));

        let svc = service_with(repo);
        let token = svc
            .generate_refresh_token(RefreshTokenId::new(), &details)
            .expect("generate");
        assert!(matches!(
            svc.validate_refresh_token(&token).await,
            Err(AppError::TokenInvalid)
        ));
    }

    #[tokio::test]
    async fn expired_row_is_lazily_deleted() {
        let details = auth_details();
        let token_id = RefreshTokenId::new();

        let mut repo = MockRefreshTokenRepository::new();
        repo.expect_find_by_id_and_user().returning(|id, user_id| {
            Ok(Some(RefreshToken {
                id,
                user_id,
                expiry_date: Utc::now() - Duration::seconds(1),
            }))
        });
        repo.expect_delete_by_id()
            .withf(move |id| *id == token_id)
            .times(1)
            .returning(|_| Ok(()));

        let svc = service_with(repo);
        let token = svc
            .generate_refresh_token(token_id, &details)
            .expect("generate");
        assert!(matches!(
            svc.validate_refresh_token(&token).await,
            Err(AppError::TokenInvalid)
        ));
    }

    #[test]
    fn cookie_pair_covers_both_token_kinds() {
        let svc = service();
        let cookies = svc
            .auth_cookies(&auth_details(), RefreshTokenId::new())
            .expect("cookies");
        assert!(cookies[0].starts_with("vsp_access="));
        assert!(cookies[1].starts_with("vsp_refresh="));
        assert!(cookies[0].contains("Max-Age=900"));
        assert!(cookies[1].contains("Max-Age=604800"));

        let cleared = svc.clear_cookies();
        assert!(cleared[0].starts_with("vsp_access=;"));
        assert!(cleared[1].contains("Max-Age=0"));
    }

    #[test]
    fn extraction_returns_none_when_cookie_absent() {
        assert!(extract_refresh_token(None).is_none());
        assert!(extract_refresh_token(Some("other=1")).is_none());
        assert_eq!(
            extract_refresh_token(Some("vsp_refresh=abc; other=1")).as_deref(),
            Some("abc")
        );
        assert_eq!(
            extract_access_token(Some("vsp_access=xyz")).as_deref(),
            Some("xyz")
        );
    }
}
