//! Projection of staking unlock eras onto wall-clock dates.

use super::types::SessionProgress;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

pub const CALCULATING_PLACEHOLDER: &str = "Calculating unlock date...";

/// Best-effort estimate of when an unlocking chunk becomes free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockEstimate {
    /// Session progress has not been received yet
    Calculating,
    At(DateTime<Utc>),
}

impl fmt::Display for UnlockEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnlockEstimate::Calculating => f.write_str(CALCULATING_PLACEHOLDER),
            UnlockEstimate::At(date) => write!(f, "{}", date.format("%Y-%m-%d %H:%M:%S UTC")),
        }
    }
}

/// Converts unlock eras into dates, assuming a fixed block time.
///
/// Actual era durations drift with chain conditions; the result is a
/// projection, not a guarantee.
#[derive(Debug, Clone, Copy)]
pub struct UnlockScheduler {
    block_time: Duration,
}

impl UnlockScheduler {
    pub fn new(block_time: Duration) -> Self {
        Self { block_time }
    }

    pub fn block_time(&self) -> Duration {
        self.block_time
    }

    /// Milliseconds from the start of the active era until `target_era` begins.
    pub fn millis_until(&self, target_era: u32, progress: &SessionProgress) -> u64 {
        let eras_left = u64::from(target_era.saturating_sub(progress.active_era));
        let blocks_left = eras_left.saturating_mul(progress.era_length);
        let block_ms = u64::try_from(self.block_time.as_millis()).unwrap_or(u64::MAX);
        blocks_left.saturating_mul(block_ms)
    }

    pub fn estimate(&self, target_era: u32, progress: Option<&SessionProgress>) -> UnlockEstimate {
        let Some(progress) = progress else {
            return UnlockEstimate::Calculating;
        };

        let unlock_ms = progress
            .active_era_start
            .saturating_add(self.millis_until(target_era, progress));
        let unlock_ms = i64::try_from(unlock_ms).unwrap_or(i64::MAX);

        match DateTime::<Utc>::from_timestamp_millis(unlock_ms) {
            Some(date) => UnlockEstimate::At(date),
            // Outside chrono's range; only reachable with absurd inputs.
            None => UnlockEstimate::At(DateTime::<Utc>::MAX_UTC),
        }
    }
}

impl Default for UnlockScheduler {
    fn default() -> Self {
        Self::new(Duration::from_secs(6))
    }
}
