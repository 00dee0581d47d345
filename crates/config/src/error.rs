use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration from environment: {0}")]
    EnvError(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    ValidateError(String),

    #[error("Invalid wallet keyring entry '{0}': expected name=suri")]
    InvalidKeyringEntry(String),
}
