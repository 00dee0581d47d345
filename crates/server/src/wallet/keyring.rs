//! In-process wallet backed by sr25519 secret URIs.

use super::{Signer, WalletAccount, WalletBridge, WalletError, encode_address};
use crate::dashboard::subscription::{Subscription, SubscriptionHandle};
use config::WalletConfig;
use sp_core::Pair as _;
use sp_core::sr25519;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

struct KeyringAccount {
    account: WalletAccount,
    pair: sr25519::Pair,
}

/// Wallet holding its keys in memory.
///
/// Every subscriber to [`WalletBridge::accounts`] receives the full account
/// list immediately and again after each [`KeyringWallet::insert`].
pub struct KeyringWallet {
    app_name: String,
    ss58_prefix: u16,
    keys: Mutex<Vec<KeyringAccount>>,
    listeners: Mutex<Vec<mpsc::UnboundedSender<Vec<WalletAccount>>>>,
}

impl KeyringWallet {
    pub fn new(app_name: impl Into<String>, ss58_prefix: u16) -> Self {
        Self {
            app_name: app_name.into(),
            ss58_prefix,
            keys: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn from_config(config: &WalletConfig) -> Result<Self, WalletError> {
        let wallet = Self::new(config.app_name.clone(), config.ss58_prefix);
        for entry in &config.keys {
            wallet.insert(&entry.name, &entry.suri)?;
        }
        tracing::info!(
            app = %wallet.app_name,
            accounts = config.keys.len(),
            "Keyring wallet ready"
        );
        Ok(wallet)
    }

    /// Add a key and notify subscribers.
    pub fn insert(&self, name: &str, suri: &str) -> Result<WalletAccount, WalletError> {
        let pair = sr25519::Pair::from_string(suri, None).map_err(|e| WalletError::InvalidKey {
            name: name.to_string(),
            reason: format!("{e:?}"),
        })?;
        let account = WalletAccount {
            address: encode_address(pair.public().0, self.ss58_prefix),
            display_name: name.to_string(),
        };

        {
            let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
            if keys.iter().any(|key| key.account.display_name == name) {
                return Err(WalletError::DuplicateName(name.to_string()));
            }
            keys.push(KeyringAccount {
                account: account.clone(),
                pair,
            });
        }

        tracing::debug!(name, address = %account.address, "Added keyring account");
        self.notify();
        Ok(account)
    }

    fn list(&self) -> Vec<WalletAccount> {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|key| key.account.clone())
            .collect()
    }

    fn notify(&self) {
        let accounts = self.list();
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|listener| listener.send(accounts.clone()).is_ok());
    }
}

impl WalletBridge for KeyringWallet {
    fn app_name(&self) -> &str {
        &self.app_name
    }

    fn accounts(&self) -> Subscription<Vec<WalletAccount>> {
        let (tx, rx) = mpsc::unbounded_channel();
        // Cannot fail: the receiver is still in scope.
        let _ = tx.send(self.list());
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        // Closed listeners are pruned on the next notification.
        Subscription::new(rx, SubscriptionHandle::noop())
    }

    fn signer(&self, address: &str) -> Result<Signer, WalletError> {
        let target = super::account_bytes(address)?;
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|key| key.pair.public().0 == target)
            .map(|key| Signer::new(key.pair.clone()))
            .ok_or_else(|| WalletError::UnknownAccount(address.to_string()))
    }
}
