// SPDX-License-Identifier: GPL-3.0-or-later

mod args;
mod chain;
mod error;
mod express;
mod log;
mod substrate;
mod wallet;

pub use args::Args;
pub use chain::ChainConfig;
pub use error::ConfigError;
pub use express::ExpressConfig;
pub use log::LogConfig;
pub use substrate::SubstrateConfig;
pub use wallet::{KeyringEntry, WalletConfig};

use serde::Deserialize;

/// Flat view of the `UMD_*` environment, as `envy` sees it.
///
/// Every field is optional so that an unset variable falls back to the
/// section default instead of failing the whole load.
#[derive(Debug, Default, Deserialize)]
struct EnvConfig {
    substrate_url: Option<String>,

    log_level: Option<String>,
    log_json: Option<bool>,
    log_strip_ansi: Option<bool>,
    log_write: Option<bool>,
    log_write_path: Option<String>,
    log_write_max_file_size: Option<u64>,
    log_write_max_files: Option<usize>,

    express_bind_host: Option<String>,
    express_port: Option<u16>,

    chain_block_time_ms: Option<u64>,
    chain_sessions_per_era: Option<u32>,
    chain_epoch_duration: Option<u64>,

    wallet_app_name: Option<String>,
    wallet_keys: Option<String>,
    wallet_ss58_prefix: Option<u16>,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardConfig {
    pub substrate: SubstrateConfig,
    pub log: LogConfig,
    pub express: ExpressConfig,
    pub chain: ChainConfig,
    pub wallet: WalletConfig,
}

impl DashboardConfig {
    /// Load configuration from `UMD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let env = envy::prefixed("UMD_").from_env::<EnvConfig>()?;
        let config = Self::from_env_config(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the given dotenv file (if it exists) and then read the environment.
    pub fn from_env_file(path: &str) -> Result<Self, ConfigError> {
        // A missing file is fine, the process environment still applies.
        let _ = dotenv::from_filename(path);
        Self::from_env()
    }

    fn from_env_config(env: EnvConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let substrate = SubstrateConfig {
            url: env.substrate_url.unwrap_or(defaults.substrate.url),
        };

        let log = LogConfig {
            level: env.log_level.unwrap_or(defaults.log.level),
            json: env.log_json.unwrap_or(defaults.log.json),
            strip_ansi: env.log_strip_ansi.unwrap_or(defaults.log.strip_ansi),
            write: env.log_write.unwrap_or(defaults.log.write),
            write_path: env.log_write_path.unwrap_or(defaults.log.write_path),
            write_max_file_size: env
                .log_write_max_file_size
                .unwrap_or(defaults.log.write_max_file_size),
            write_max_files: env.log_write_max_files.unwrap_or(defaults.log.write_max_files),
        };

        let express = ExpressConfig {
            bind_host: env.express_bind_host.unwrap_or(defaults.express.bind_host),
            port: env.express_port.unwrap_or(defaults.express.port),
        };

        let chain = ChainConfig {
            block_time_ms: env.chain_block_time_ms.unwrap_or(defaults.chain.block_time_ms),
            sessions_per_era: env
                .chain_sessions_per_era
                .unwrap_or(defaults.chain.sessions_per_era),
            epoch_duration: env.chain_epoch_duration.unwrap_or(defaults.chain.epoch_duration),
        };

        let keys = match env.wallet_keys {
            Some(raw) => wallet::parse_keyring(&raw)?,
            None => defaults.wallet.keys,
        };

        let wallet = WalletConfig {
            app_name: env.wallet_app_name.unwrap_or(defaults.wallet.app_name),
            keys,
            ss58_prefix: env.wallet_ss58_prefix.unwrap_or(defaults.wallet.ss58_prefix),
        };

        Ok(Self {
            substrate,
            log,
            express,
            chain,
            wallet,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.substrate.validate()?;
        self.log.validate()?;
        self.express.validate()?;
        self.chain.validate()?;
        self.wallet.validate()?;
        Ok(())
    }
}
