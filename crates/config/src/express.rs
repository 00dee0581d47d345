use crate::ConfigError;
use std::net::IpAddr;
use std::str::FromStr;

/// Validates that a string is a valid host (IP address or hostname)
fn is_valid_host(host: &str) -> bool {
    if IpAddr::from_str(host).is_ok() {
        return true;
    }

    // RFC 1123 hostname
    if host.is_empty() || host.len() > 253 {
        return false;
    }

    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

#[derive(Debug, Clone)]
pub struct ExpressConfig {
    /// Host to bind the HTTP server to
    ///
    /// Env: UMD_EXPRESS_BIND_HOST
    /// Default: 127.0.0.1
    pub bind_host: String,

    /// Port to bind the HTTP server to
    ///
    /// Env: UMD_EXPRESS_PORT
    /// Default: 8080
    pub port: u16,
}

fn default_bind_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl ExpressConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ValidateError(
                "Express port cannot be 0".to_string(),
            ));
        }

        if !is_valid_host(&self.bind_host) {
            return Err(ConfigError::ValidateError(format!(
                "Invalid bind host '{}'",
                self.bind_host
            )));
        }

        Ok(())
    }
}

impl Default for ExpressConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            port: default_port(),
        }
    }
}
