use crate::ConfigError;
use std::time::Duration;

/// Chain-specific timing constants used to project unlock dates.
///
/// Defaults match the Polkadot relay chain: 6 second blocks, 2400 block
/// epochs and 6 sessions per era (one era per day).
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Expected block time in milliseconds
    ///
    /// Env: UMD_CHAIN_BLOCK_TIME_MS
    /// Default: 6000
    pub block_time_ms: u64,

    /// Number of sessions in one staking era
    ///
    /// Env: UMD_CHAIN_SESSIONS_PER_ERA
    /// Default: 6
    pub sessions_per_era: u32,

    /// Length of one BABE epoch (session) in blocks
    ///
    /// Env: UMD_CHAIN_EPOCH_DURATION
    /// Default: 2400
    pub epoch_duration: u64,
}

impl ChainConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.block_time_ms == 0 {
            return Err(ConfigError::ValidateError(
                "Block time must be greater than 0".to_string(),
            ));
        }
        if self.sessions_per_era == 0 {
            return Err(ConfigError::ValidateError(
                "Sessions per era must be greater than 0".to_string(),
            ));
        }
        if self.epoch_duration == 0 {
            return Err(ConfigError::ValidateError(
                "Epoch duration must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn block_time(&self) -> Duration {
        Duration::from_millis(self.block_time_ms)
    }

    /// Era length in blocks.
    pub fn era_length(&self) -> u64 {
        self.epoch_duration
            .saturating_mul(u64::from(self.sessions_per_era))
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            block_time_ms: 6000,
            sessions_per_era: 6,
            epoch_duration: 2400,
        }
    }
}
