//! Test fixtures: a scriptable in-memory chain and a keyring with dev accounts.
//!
//! [`FakeChain`] records every subscribe and unsubscribe in an [`EventLog`]
//! so tests can assert on lifecycle ordering, and lets tests push values into
//! live subscriptions as if they came from a node.

use crate::chain::{ChainClient, ChainError, ExtrinsicCall, TxStatus};
use crate::dashboard::subscription::Subscription;
use crate::dashboard::types::{
    AccountBalanceSnapshot, SessionProgress, StakingLedger, TokenInfo, UnlockChunk,
};
use crate::wallet::{KeyringWallet, Signer};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;

/// Alice's dev account with the generic substrate prefix (42).
pub const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

/// Bob's dev account with the generic substrate prefix (42).
pub const BOB: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";

pub const TEST_BLOCK_HASH: &str =
    "0x1234567890123456789012345678901234567890123456789012345678901234";

/// Keyring holding Alice and Bob.
pub fn dev_wallet() -> Arc<KeyringWallet> {
    let wallet = KeyringWallet::new("unlock-my-dot-test", 42);
    wallet.insert("Alice", "//Alice").unwrap();
    wallet.insert("Bob", "//Bob").unwrap();
    Arc::new(wallet)
}

pub fn dot() -> TokenInfo {
    TokenInfo {
        symbol: "DOT".to_string(),
        decimals: 10,
    }
}

/// A snapshot with some vesting in flight: 100 DOT free, 60 locked by
/// vesting, 20 of which are claimable.
pub fn vesting_snapshot() -> AccountBalanceSnapshot {
    const DOT: u128 = 10_000_000_000;
    AccountBalanceSnapshot {
        free_balance: 100 * DOT,
        reserved_balance: 0,
        locked_balance: 60 * DOT,
        available_balance: 40 * DOT,
        locked_breakdown: vec![crate::dashboard::types::BalanceLock {
            id: "vesting".to_string(),
            amount: 60 * DOT,
        }],
        vested_balance: 30 * DOT,
        vested_claimable: 20 * DOT,
        vesting_locked: 40 * DOT,
        vesting_total: 70 * DOT,
        vesting: vec![crate::dashboard::types::VestingSchedule {
            locked: 70 * DOT,
            per_block: DOT,
            starting_block: 100,
        }],
    }
}

pub fn unbonding_ledger() -> StakingLedger {
    StakingLedger {
        total: 1_500,
        active: 1_000,
        unlocking: vec![
            UnlockChunk { value: 300, era: 12 },
            UnlockChunk { value: 200, era: 13 },
        ],
    }
}

pub fn progress() -> SessionProgress {
    SessionProgress {
        active_era: 10,
        era_length: 100,
        active_era_start: 1_700_000_000_000,
    }
}

/// Ordered record of subscription lifecycle events.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn record(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }
}

/// In-memory [`ChainClient`].
#[derive(Default)]
pub struct FakeChain {
    pub log: EventLog,
    token: Mutex<Option<TokenInfo>>,
    fail_subscriptions: AtomicBool,
    balances: Mutex<HashMap<String, UnboundedSender<AccountBalanceSnapshot>>>,
    ledgers: Mutex<HashMap<String, UnboundedSender<Option<StakingLedger>>>>,
    progress: Mutex<Option<UnboundedSender<SessionProgress>>>,
    tx_script: Mutex<Vec<TxStatus>>,
}

impl FakeChain {
    pub fn new() -> Arc<Self> {
        let chain = Self::default();
        *chain.token.lock().unwrap() = Some(dot());
        Arc::new(chain)
    }

    /// Make `chain_properties` fail until a token is set again.
    pub fn clear_token(&self) {
        *self.token.lock().unwrap() = None;
    }

    pub fn set_token(&self, token: TokenInfo) {
        *self.token.lock().unwrap() = Some(token);
    }

    pub fn fail_subscriptions(&self, fail: bool) {
        self.fail_subscriptions.store(fail, Ordering::SeqCst);
    }

    /// Statuses the next submission will report, in order.
    pub fn script_tx(&self, statuses: Vec<TxStatus>) {
        *self.tx_script.lock().unwrap() = statuses;
    }

    pub fn push_balances(&self, address: &str, snapshot: AccountBalanceSnapshot) -> bool {
        self.balances
            .lock()
            .unwrap()
            .get(address)
            .is_some_and(|tx| tx.send(snapshot).is_ok())
    }

    pub fn push_ledger(&self, address: &str, ledger: Option<StakingLedger>) -> bool {
        self.ledgers
            .lock()
            .unwrap()
            .get(address)
            .is_some_and(|tx| tx.send(ledger).is_ok())
    }

    pub fn push_progress(&self, progress: SessionProgress) -> bool {
        self.progress
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|tx| tx.send(progress).is_ok())
    }

    /// End the balances feed for `address` as if the node dropped it.
    pub fn close_balances(&self, address: &str) -> bool {
        self.balances.lock().unwrap().remove(address).is_some()
    }

    fn check_available(&self, what: &str) -> Result<(), ChainError> {
        if self.fail_subscriptions.load(Ordering::SeqCst) {
            self.log.record(format!("failed {what}"));
            return Err(ChainError::Unavailable("fake chain offline".to_string()));
        }
        Ok(())
    }

    fn open<T: Send + 'static>(&self, label: String) -> (UnboundedSender<T>, Subscription<T>) {
        self.log.record(format!("subscribe {label}"));
        let log = self.log.clone();
        Subscription::channel(move || log.record(format!("unsubscribe {label}")))
    }
}

impl ChainClient for FakeChain {
    fn chain_properties(&self) -> BoxFuture<'_, Result<TokenInfo, ChainError>> {
        Box::pin(async move {
            self.token
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ChainError::Unavailable("no properties".to_string()))
        })
    }

    fn subscribe_balances<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Subscription<AccountBalanceSnapshot>, ChainError>> {
        Box::pin(async move {
            self.check_available("balances")?;
            let (tx, subscription) = self.open(format!("balances {address}"));
            self.balances.lock().unwrap().insert(address.to_string(), tx);
            Ok(subscription)
        })
    }

    fn subscribe_staking_ledger<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Subscription<Option<StakingLedger>>, ChainError>> {
        Box::pin(async move {
            self.check_available("staking ledger")?;
            let (tx, subscription) = self.open(format!("ledger {address}"));
            self.ledgers.lock().unwrap().insert(address.to_string(), tx);
            Ok(subscription)
        })
    }

    fn subscribe_session_progress(
        &self,
    ) -> BoxFuture<'_, Result<Subscription<SessionProgress>, ChainError>> {
        Box::pin(async move {
            self.check_available("session progress")?;
            let (tx, subscription) = self.open("progress".to_string());
            *self.progress.lock().unwrap() = Some(tx);
            Ok(subscription)
        })
    }

    fn submit_extrinsic<'a>(
        &'a self,
        call: ExtrinsicCall,
        signer_address: &'a str,
        signer: Signer,
    ) -> BoxFuture<'a, Result<Subscription<TxStatus>, ChainError>> {
        Box::pin(async move {
            if !signer.controls(signer_address) {
                return Err(ChainError::SignerMismatch(signer_address.to_string()));
            }
            self.log.record(format!("submit {call} {signer_address}"));
            let (tx, subscription) = Subscription::channel(|| {});
            for status in self.tx_script.lock().unwrap().drain(..) {
                let _ = tx.send(status);
            }
            Ok(subscription)
        })
    }
}
