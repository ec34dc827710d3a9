//! Periodic sweeper for expired passcodes, reset tokens and refresh tokens.
//! Runs as its own process next to the API server.

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use identity_service::config::Config;
use identity_service::db::connection::create_pool;
use identity_service::repositories::{
    PgPasscodeRepository, PgRefreshTokenRepository, PgResetTokenRepository,
};
use identity_service::services::SweeperService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url).await?;

    let sweeper = SweeperService::new(
        Arc::new(PgPasscodeRepository::new(pool.clone())),
        Arc::new(PgResetTokenRepository::new(pool.clone())),
        Arc::new(PgRefreshTokenRepository::new(pool)),
    );

    let interval = Duration::from_secs(config.sweep_interval_seconds.max(1));
    tracing::info!(interval_seconds = interval.as_secs(), "Credential sweeper started");

    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        // A failed sweep is retried on the next tick; expired rows are
        // already unusable in the meantime.
        if let Err(err) = sweeper.sweep_expired().await {
            tracing::error!(error = ?err, "Sweep failed");
        }
    }
}
