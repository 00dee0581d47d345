use crate::ConfigError;

#[derive(Debug, Clone)]
pub struct SubstrateConfig {
    /// Substrate node WebSocket or HTTP URL
    ///
    /// Env: UMD_SUBSTRATE_URL
    /// Valid schemes: ws://, wss://, http://, https://
    /// Default: wss://rpc.polkadot.io
    pub url: String,
}

impl SubstrateConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::ValidateError(
                "Substrate URL cannot be empty".to_string(),
            ));
        }

        Self::validate_url(&self.url)
    }

    /// Validate a single URL
    fn validate_url(url_str: &str) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(url_str)
            .map_err(|e| ConfigError::ValidateError(format!("Invalid URL '{}': {}", url_str, e)))?;

        match parsed.scheme() {
            "ws" | "wss" | "http" | "https" => Ok(()),
            scheme => Err(ConfigError::ValidateError(format!(
                "Invalid URL scheme '{}'. Must be ws://, wss://, http://, or https://",
                scheme
            ))),
        }
    }

    /// Whether the URL points at a non-TLS endpoint.
    ///
    /// Local development nodes are usually reached over plain `ws://`, which
    /// needs the insecure RPC client constructor.
    pub fn is_insecure(&self) -> bool {
        self.url.starts_with("ws://") || self.url.starts_with("http://")
    }
}

impl Default for SubstrateConfig {
    fn default() -> Self {
        Self {
            url: "wss://rpc.polkadot.io".to_string(),
        }
    }
}
