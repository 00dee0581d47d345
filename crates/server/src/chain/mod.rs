// SPDX-License-Identifier: GPL-3.0-or-later

//! Chain client boundary.
//!
//! [`ChainClient`] is everything the dashboard needs from a node: token
//! metadata, push subscriptions for the three data sources, and extrinsic
//! submission. [`RpcChainClient`] implements it over JSON-RPC.

mod rpc;
pub mod storage;
mod tx;

pub use rpc::RpcChainClient;

use crate::dashboard::subscription::Subscription;
use crate::dashboard::types::{AccountBalanceSnapshot, SessionProgress, StakingLedger, TokenInfo};
use crate::wallet::Signer;
use futures::future::BoxFuture;
use std::fmt;
use thiserror::Error;

// ================================================================================================
// Error Types
// ================================================================================================

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Chain client unavailable: {0}")]
    Unavailable(String),

    #[error("RPC request failed: {0}")]
    Rpc(Box<subxt_rpcs::Error>),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to decode {what}: {source}")]
    DecodeFailed {
        what: &'static str,
        #[source]
        source: parity_scale_codec::Error,
    },

    #[error("Invalid storage change set: {0}")]
    InvalidChangeSet(String),

    #[error("Signer does not control address {0}")]
    SignerMismatch(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl From<subxt_rpcs::Error> for ChainError {
    fn from(err: subxt_rpcs::Error) -> Self {
        ChainError::Rpc(Box::new(err))
    }
}

// ================================================================================================
// Extrinsics
// ================================================================================================

/// A call without arguments, addressed by pallet and call name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtrinsicCall {
    pub pallet: &'static str,
    pub call: &'static str,
}

impl ExtrinsicCall {
    /// `Vesting::vest()`: unlock whatever has vested for the signer.
    pub const VESTING_VEST: ExtrinsicCall = ExtrinsicCall {
        pallet: "Vesting",
        call: "vest",
    };
}

impl fmt::Display for ExtrinsicCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.pallet, self.call)
    }
}

/// Progress of a submitted extrinsic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// Accepted into the pool
    Ready,
    /// Gossiped to peers
    Broadcast,
    /// Included in a best block, with that block's hash
    InBlock(String),
    /// The best block that included it was retracted
    Retracted,
    /// Included in a finalized block, with that block's hash
    Finalized(String),
    Dropped(String),
    Invalid(String),
    Error(String),
}

impl TxStatus {
    /// No further updates follow a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TxStatus::Finalized(_) | TxStatus::Dropped(_) | TxStatus::Invalid(_) | TxStatus::Error(_)
        )
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Ready => f.write_str("Ready"),
            TxStatus::Broadcast => f.write_str("Broadcast"),
            TxStatus::InBlock(hash) => write!(f, "InBlock({hash})"),
            TxStatus::Retracted => f.write_str("Retracted"),
            TxStatus::Finalized(hash) => write!(f, "Finalized({hash})"),
            TxStatus::Dropped(reason) => write!(f, "Dropped({reason})"),
            TxStatus::Invalid(reason) => write!(f, "Invalid({reason})"),
            TxStatus::Error(reason) => write!(f, "Error({reason})"),
        }
    }
}

// ================================================================================================
// Client Trait
// ================================================================================================

/// Source of chain state and transaction submission.
///
/// Every subscription delivers complete records. Releasing one goes through
/// its [`SubscriptionHandle`](crate::dashboard::subscription::SubscriptionHandle).
pub trait ChainClient: Send + Sync {
    /// Token symbol and decimals of the connected chain.
    fn chain_properties(&self) -> BoxFuture<'_, Result<TokenInfo, ChainError>>;

    fn subscribe_balances<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Subscription<AccountBalanceSnapshot>, ChainError>>;

    /// Delivers `None` while the account has no staking ledger.
    fn subscribe_staking_ledger<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Subscription<Option<StakingLedger>>, ChainError>>;

    fn subscribe_session_progress(
        &self,
    ) -> BoxFuture<'_, Result<Subscription<SessionProgress>, ChainError>>;

    /// Sign `call` with `signer` and watch it until it is finalized or fails.
    ///
    /// Dropping the returned subscription only stops the updates; it cannot
    /// recall a transaction that was already sent.
    fn submit_extrinsic<'a>(
        &'a self,
        call: ExtrinsicCall,
        signer_address: &'a str,
        signer: Signer,
    ) -> BoxFuture<'a, Result<Subscription<TxStatus>, ChainError>>;
}
