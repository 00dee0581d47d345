// SPDX-License-Identifier: GPL-3.0-or-later

//! Wallet boundary: account discovery and signing.

mod keyring;

pub use keyring::KeyringWallet;

use crate::dashboard::subscription::Subscription;
use serde::Serialize;
use sp_core::Pair as _;
use sp_core::crypto::{AccountId32, Ss58Codec};
use sp_core::sr25519;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Account {0} is not available in the wallet")]
    UnknownAccount(String),

    #[error("Invalid key '{name}': {reason}")]
    InvalidKey { name: String, reason: String },

    #[error("Duplicate key name '{0}'")]
    DuplicateName(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// An account the wallet can sign for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
    pub address: String,
    pub display_name: String,
}

/// Signing capability for one account.
///
/// Handed out per request and consumed by the submission that uses it.
pub struct Signer {
    pair: sr25519::Pair,
}

impl Signer {
    pub(crate) fn new(pair: sr25519::Pair) -> Self {
        Self { pair }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.pair.public().0
    }

    pub fn sign_bytes(&self, payload: &[u8]) -> [u8; 64] {
        self.pair.sign(payload).0
    }

    /// Whether `address` (in any SS58 format) belongs to this signer.
    pub fn controls(&self, address: &str) -> bool {
        account_bytes(address).is_ok_and(|bytes| bytes == self.public_key())
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("public", &hex::encode(self.public_key()))
            .finish()
    }
}

/// Source of accounts and signers.
pub trait WalletBridge: Send + Sync {
    /// Name the dashboard registered with.
    fn app_name(&self) -> &str;

    /// Current accounts, followed by a full list again whenever they change.
    fn accounts(&self) -> Subscription<Vec<WalletAccount>>;

    fn signer(&self, address: &str) -> Result<Signer, WalletError>;
}

/// Decode an SS58 address to its raw account id.
pub fn account_bytes(address: &str) -> Result<[u8; 32], WalletError> {
    AccountId32::from_ss58check(address)
        .map(Into::into)
        .map_err(|e| WalletError::InvalidAddress(format!("{address}: {e:?}")))
}

pub fn encode_address(public: [u8; 32], ss58_prefix: u16) -> String {
    AccountId32::from(public).to_ss58check_with_version(ss58_prefix.into())
}
