//! Expired-credential sweeping, run on an interval by the sweeper binary.
//!
//! Expired rows are already unusable (every read path checks expiry), so
//! the sweep is pure housekeeping and safe to run at any cadence.

use chrono::Utc;
use std::sync::Arc;

use crate::error::AppError;
use crate::repositories::{PasscodeRepository, RefreshTokenRepository, ResetTokenRepository};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub passcodes: u64,
    pub reset_tokens: u64,
    pub refresh_tokens: u64,
}

impl SweepReport {
    pub fn total(&self) -> u64 {
        self.passcodes + self.reset_tokens + self.refresh_tokens
    }
}

pub struct SweeperService {
    passcodes: Arc<dyn PasscodeRepository>,
    reset_tokens: Arc<dyn ResetTokenRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

impl SweeperService {
    pub fn new(
        passcodes: Arc<dyn PasscodeRepository>,
        reset_tokens: Arc<dyn ResetTokenRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
    ) -> Self {
        Self {
            passcodes,
            reset_tokens,
            refresh_tokens,
        }
    }

    /// Deletes every row whose expiry is in the past, across all three
    /// expiring stores.
    pub async fn sweep_expired(&self) -> Result<SweepReport, AppError> {
        let now = Utc::now();
        let report = SweepReport {
            passcodes: self.passcodes.delete_expired(now).await?,
            reset_tokens: self.reset_tokens.delete_expired(now).await?,
            refresh_tokens: self.refresh_tokens.delete_expired(now).await?,
        };

        if report.total() > 0 {
            tracing::info!(
                passcodes = report.passcodes,
                reset_tokens = report.reset_tokens,
                refresh_tokens = report.refresh_tokens,
                "Swept expired credentials"
            );
        } else {
            tracing::debug!("Sweep found nothing to delete");
        }
        Ok(report)
    }
}
