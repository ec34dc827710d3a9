use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::clients::{HttpUserProfileClient, UserProfileClient};
use crate::config::Config;
use crate::notifications::smtp::SmtpNotificationProducer;
use crate::notifications::NotificationProducer;
use crate::repositories::{
    PasscodeRepository, PasswordRepository, PgPasscodeRepository, PgPasswordRepository,
    PgRefreshTokenRepository, PgResetTokenRepository, RefreshTokenRepository,
    ResetTokenRepository,
};
use crate::services::{
    AuthService, DataDeletionService, PasscodeService, PasswordService, ResetTokenService,
    SessionTokenService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth: Arc<AuthService>,
    pub passwords: Arc<PasswordService>,
    pub passcodes: Arc<PasscodeService>,
    pub data_deletion: Arc<DataDeletionService>,
    pub session_tokens: Arc<SessionTokenService>,
}

impl AppState {
    /// Wires the production implementations: Postgres repositories, the HTTP
    /// profile client and the SMTP producer.
    pub fn build(pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let user_profiles: Arc<dyn UserProfileClient> = Arc::new(HttpUserProfileClient::new(
            &config.user_service_url,
            Duration::from_secs(config.upstream_timeout_seconds),
        )?);
        let notifications: Arc<dyn NotificationProducer> =
            Arc::new(SmtpNotificationProducer::new()?);

        let passwords: Arc<dyn PasswordRepository> =
            Arc::new(PgPasswordRepository::new(pool.clone()));
        let passcodes: Arc<dyn PasscodeRepository> =
            Arc::new(PgPasscodeRepository::new(pool.clone()));
        let reset_tokens: Arc<dyn ResetTokenRepository> =
            Arc::new(PgResetTokenRepository::new(pool.clone()));
        let refresh_tokens: Arc<dyn RefreshTokenRepository> =
            Arc::new(PgRefreshTokenRepository::new(pool));

        Ok(Self::from_parts(
            config,
            user_profiles,
            notifications,
            passwords,
            passcodes,
            reset_tokens,
            refresh_tokens,
        ))
    }

    /// Wires the service graph from trait objects. Tests use this with mock
    /// or in-memory implementations.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        config: Config,
        user_profiles: Arc<dyn UserProfileClient>,
        notifications: Arc<dyn NotificationProducer>,
        passwords: Arc<dyn PasswordRepository>,
        passcodes: Arc<dyn PasscodeRepository>,
        reset_tokens: Arc<dyn ResetTokenRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
    ) -> Self {
        let session_tokens = Arc::new(SessionTokenService::from_config(
            &config,
            Arc::clone(&refresh_tokens),
        ));
        let reset_token_service = Arc::new(ResetTokenService::new(Arc::clone(&reset_tokens)));
        let password_service = Arc::new(PasswordService::new(
            Arc::clone(&passwords),
            reset_token_service,
            Arc::clone(&user_profiles),
            Arc::clone(&notifications),
        ));
        let passcode_service = Arc::new(PasscodeService::new(
            Arc::clone(&passcodes),
            Arc::clone(&user_profiles),
            Arc::clone(&notifications),
        ));
        let auth = Arc::new(AuthService::new(
            user_profiles,
            Arc::clone(&refresh_tokens),
            Arc::clone(&session_tokens),
            Arc::clone(&password_service),
            Arc::clone(&passcode_service),
            notifications,
        ));
        let data_deletion = Arc::new(DataDeletionService::new(
            passwords,
            passcodes,
            reset_tokens,
            refresh_tokens,
        ));

        Self {
            config,
            auth,
            passwords: password_service,
            passcodes: passcode_service,
            data_deletion,
            session_tokens,
        }
    }
}
