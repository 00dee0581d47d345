use crate::ConfigError;
use std::collections::HashSet;

/// A named development key, given as a secret URI (`//Alice`, a mnemonic, ...).
#[derive(Clone, PartialEq, Eq)]
pub struct KeyringEntry {
    pub name: String,
    pub suri: String,
}

// Keep secret URIs out of debug output and logs.
impl std::fmt::Debug for KeyringEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringEntry")
            .field("name", &self.name)
            .field("suri", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// Name the dashboard announces itself with when enabling the wallet
    ///
    /// Env: UMD_WALLET_APP_NAME
    /// Default: unlock-my-dot
    pub app_name: String,

    /// Signing accounts exposed by the keyring wallet
    ///
    /// Env: UMD_WALLET_KEYS
    /// Format: comma separated `name=suri` pairs
    /// Example: 'Alice=//Alice,Bob=//Bob'
    /// Default: none
    pub keys: Vec<KeyringEntry>,

    /// SS58 address prefix used to display accounts
    ///
    /// Env: UMD_WALLET_SS58_PREFIX
    /// Default: 0 (Polkadot)
    pub ss58_prefix: u16,
}

pub(crate) fn parse_keyring(raw: &str) -> Result<Vec<KeyringEntry>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, suri) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidKeyringEntry(redact(entry)))?;
            let (name, suri) = (name.trim(), suri.trim());
            if name.is_empty() || suri.is_empty() {
                return Err(ConfigError::InvalidKeyringEntry(redact(entry)));
            }
            Ok(KeyringEntry {
                name: name.to_string(),
                suri: suri.to_string(),
            })
        })
        .collect()
}

fn redact(entry: &str) -> String {
    match entry.split_once('=') {
        Some((name, _)) => format!("{}=<redacted>", name.trim()),
        None => "<redacted>".to_string(),
    }
}

impl WalletConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.is_empty() {
            return Err(ConfigError::ValidateError(
                "Wallet app name cannot be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for key in &self.keys {
            if !seen.insert(key.name.as_str()) {
                return Err(ConfigError::ValidateError(format!(
                    "Duplicate wallet key name: {}",
                    key.name
                )));
            }
        }

        // SS58 reserves prefixes above 16383
        if self.ss58_prefix > 16_383 {
            return Err(ConfigError::ValidateError(format!(
                "Invalid SS58 prefix {}",
                self.ss58_prefix
            )));
        }

        Ok(())
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            app_name: "unlock-my-dot".to_string(),
            keys: Vec::new(),
            ss58_prefix: 0,
        }
    }
}
