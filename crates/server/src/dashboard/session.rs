// SPDX-License-Identifier: GPL-3.0-or-later

//! The coordinating context that owns every piece of dashboard state.
//!
//! A [`DashboardSession`] holds the chain client, the wallet, and the live
//! subscriptions for the selected account. Everything it learns is published
//! through `tokio::sync::watch` channels; readers take a [`DashboardView`]
//! and never write.
//!
//! Switching accounts, swapping the chain client, or dropping the session
//! releases every live subscription before anything new is established.
//! Values delivered by a released subscription are discarded.

use super::subscription::{Subscription, SubscriptionHandle};
use super::types::{AccountBalanceSnapshot, SelectedAccount, SessionProgress, StakingLedger, TokenInfo};
use super::unlock::UnlockScheduler;
use crate::chain::{ChainClient, ChainError, ExtrinsicCall, TxStatus};
use crate::wallet::{WalletAccount, WalletBridge};
use futures::stream::{self, BoxStream, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No chain client connected")]
    ChainNotConnected,

    #[error("No wallet connected")]
    WalletNotConnected,

    #[error("Account {0} is not provided by the wallet")]
    UnknownAccount(String),
}

/// Data sources kept live for the selected account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    Balances,
    StakingLedger,
    SessionProgress,
}

impl DataSource {
    pub const ALL: [DataSource; 3] = [
        DataSource::Balances,
        DataSource::StakingLedger,
        DataSource::SessionProgress,
    ];
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataSource::Balances => "balances",
            DataSource::StakingLedger => "staking ledger",
            DataSource::SessionProgress => "session progress",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub chain_connected: bool,
    pub wallet_connected: bool,
}

// ================================================================================================
// Published State
// ================================================================================================

struct Publishers {
    token: watch::Sender<Option<TokenInfo>>,
    balances: watch::Sender<Option<AccountBalanceSnapshot>>,
    ledger: watch::Sender<Option<StakingLedger>>,
    progress: watch::Sender<Option<SessionProgress>>,
    selected: watch::Sender<Option<SelectedAccount>>,
    accounts: watch::Sender<Vec<WalletAccount>>,
    status: watch::Sender<ConnectionStatus>,
}

impl Publishers {
    fn new() -> Self {
        Self {
            token: watch::channel(None).0,
            balances: watch::channel(None).0,
            ledger: watch::channel(None).0,
            progress: watch::channel(None).0,
            selected: watch::channel(None).0,
            accounts: watch::channel(Vec::new()).0,
            status: watch::channel(ConnectionStatus::default()).0,
        }
    }

    fn reset(&self, source: DataSource) {
        match source {
            DataSource::Balances => {
                self.balances.send_replace(None);
            }
            DataSource::StakingLedger => {
                self.ledger.send_replace(None);
            }
            DataSource::SessionProgress => {
                self.progress.send_replace(None);
            }
        }
    }
}

/// Read-only view of the session's state.
///
/// Every accessor returns the latest complete value, or `None` while the
/// value is not yet available.
#[derive(Clone)]
pub struct DashboardView {
    token: watch::Receiver<Option<TokenInfo>>,
    balances: watch::Receiver<Option<AccountBalanceSnapshot>>,
    ledger: watch::Receiver<Option<StakingLedger>>,
    progress: watch::Receiver<Option<SessionProgress>>,
    selected: watch::Receiver<Option<SelectedAccount>>,
    accounts: watch::Receiver<Vec<WalletAccount>>,
    status: watch::Receiver<ConnectionStatus>,
    scheduler: UnlockScheduler,
}

impl DashboardView {
    pub fn token(&self) -> Option<TokenInfo> {
        self.token.borrow().clone()
    }

    pub fn balances(&self) -> Option<AccountBalanceSnapshot> {
        self.balances.borrow().clone()
    }

    pub fn staking_ledger(&self) -> Option<StakingLedger> {
        self.ledger.borrow().clone()
    }

    pub fn session_progress(&self) -> Option<SessionProgress> {
        self.progress.borrow().clone()
    }

    pub fn selected_account(&self) -> Option<SelectedAccount> {
        self.selected.borrow().clone()
    }

    pub fn accounts(&self) -> Vec<WalletAccount> {
        self.accounts.borrow().clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    pub fn scheduler(&self) -> UnlockScheduler {
        self.scheduler
    }
}

// ================================================================================================
// Live Subscriptions
// ================================================================================================

struct LiveSource {
    source: DataSource,
    handle: SubscriptionHandle,
    pump: JoinHandle<()>,
    live: Arc<AtomicBool>,
}

impl LiveSource {
    /// Forward every delivery of `subscription` through `deliver`, which
    /// receives the liveness flag cleared on release.
    ///
    /// A feed that closes without being released clears the flag itself and
    /// puts its value back to "not yet available".
    fn spawn<T, F>(
        source: DataSource,
        subscription: Subscription<T>,
        publishers: Arc<Publishers>,
        deliver: F,
    ) -> Self
    where
        T: Send + 'static,
        F: Fn(&Publishers, &AtomicBool, T) + Send + 'static,
    {
        let live = Arc::new(AtomicBool::new(true));
        let (mut updates, handle) = subscription.into_parts();
        let flag = live.clone();
        let pump = tokio::spawn(async move {
            while let Some(value) = updates.recv().await {
                deliver(&publishers, &flag, value);
            }
            if flag.swap(false, Ordering::AcqRel) {
                publishers.reset(source);
                tracing::warn!(%source, "Subscription closed by the chain");
            }
        });
        Self {
            source,
            handle,
            pump,
            live,
        }
    }

    fn is_closed(&self) -> bool {
        self.pump.is_finished()
    }

    fn release(self) {
        self.live.store(false, Ordering::Release);
        self.handle.unsubscribe();
        self.pump.abort();
    }
}

/// Replace the value in `sender` unless its source was released meanwhile.
/// The flag is checked under the channel's lock, so a late delivery cannot
/// overwrite the reset that follows a release.
fn publish<T>(sender: &watch::Sender<T>, live: &AtomicBool, value: T) {
    sender.send_if_modified(|slot| {
        if !live.load(Ordering::Acquire) {
            return false;
        }
        *slot = value;
        true
    });
}

// ================================================================================================
// Session
// ================================================================================================

pub struct DashboardSession {
    scheduler: UnlockScheduler,
    chain: Option<Arc<dyn ChainClient>>,
    wallet: Option<Arc<dyn WalletBridge>>,
    publishers: Arc<Publishers>,
    sources: Vec<LiveSource>,
    wallet_feed: Option<(SubscriptionHandle, JoinHandle<()>)>,
    chain_unreachable: bool,
}

impl DashboardSession {
    pub fn new(scheduler: UnlockScheduler) -> Self {
        Self {
            scheduler,
            chain: None,
            wallet: None,
            publishers: Arc::new(Publishers::new()),
            sources: Vec::new(),
            wallet_feed: None,
            chain_unreachable: false,
        }
    }

    pub fn view(&self) -> DashboardView {
        let p = &self.publishers;
        DashboardView {
            token: p.token.subscribe(),
            balances: p.balances.subscribe(),
            ledger: p.ledger.subscribe(),
            progress: p.progress.subscribe(),
            selected: p.selected.subscribe(),
            accounts: p.accounts.subscribe(),
            status: p.status.subscribe(),
            scheduler: self.scheduler,
        }
    }

    pub fn selected_address(&self) -> Option<String> {
        self.publishers
            .selected
            .borrow()
            .as_ref()
            .map(|account| account.address.clone())
    }

    /// Sources with a live subscription right now.
    pub fn live_sources(&self) -> Vec<DataSource> {
        self.sources
            .iter()
            .filter(|live| !live.is_closed())
            .map(|live| live.source)
            .collect()
    }

    /// Whether the last attempt to subscribe failed for every source it
    /// tried. The chain client is most likely gone and needs replacing.
    pub fn chain_unreachable(&self) -> bool {
        self.chain_unreachable
    }

    /// Attach a chain client, replacing any previous one.
    ///
    /// Failures to fetch token info or to subscribe are logged and leave the
    /// affected values unavailable; [`DashboardSession::refresh`] retries them.
    pub async fn connect_chain(&mut self, client: Arc<dyn ChainClient>) {
        self.release_all();
        self.publishers.token.send_replace(None);
        self.chain = Some(client);
        self.set_status(|status| status.chain_connected = true);

        self.fetch_token_info().await;
        self.establish_missing().await;
    }

    /// Detach the chain client. Every chain-derived value becomes unavailable.
    pub fn disconnect_chain(&mut self) {
        self.release_all();
        self.publishers.token.send_replace(None);
        self.chain = None;
        self.chain_unreachable = false;
        self.set_status(|status| status.chain_connected = false);
        tracing::info!("Chain client disconnected");
    }

    /// Attach a wallet and follow its account list. The first account is
    /// selected if nothing is selected yet.
    pub async fn connect_wallet(&mut self, wallet: Arc<dyn WalletBridge>) {
        self.release_wallet_feed();

        let (mut updates, handle) = wallet.accounts().into_parts();
        let initial = updates.recv().await.unwrap_or_default();
        tracing::info!(
            app = wallet.app_name(),
            accounts = initial.len(),
            "Wallet connected"
        );
        self.publishers.accounts.send_replace(initial);

        let publishers = self.publishers.clone();
        let pump = tokio::spawn(async move {
            while let Some(accounts) = updates.recv().await {
                publishers.accounts.send_replace(accounts);
            }
        });
        self.wallet_feed = Some((handle, pump));
        self.wallet = Some(wallet);
        self.set_status(|status| status.wallet_connected = true);

        self.auto_select().await;
    }

    /// Select the account with `address`. Subscriptions for the previous
    /// account are released before the new ones are established.
    pub async fn select_account(&mut self, address: &str) -> Result<SelectedAccount, SessionError> {
        if self.wallet.is_none() {
            return Err(SessionError::WalletNotConnected);
        }
        let account = self
            .publishers
            .accounts
            .borrow()
            .iter()
            .find(|account| account.address == address)
            .cloned()
            .ok_or_else(|| SessionError::UnknownAccount(address.to_string()))?;

        Ok(self.switch_to(account).await)
    }

    /// Retry whatever is missing: token info, live subscriptions, and the
    /// initial account selection. Feeds the chain closed on its own are
    /// subscribed again.
    pub async fn refresh(&mut self) {
        let token_missing = self.publishers.token.borrow().is_none();
        if token_missing {
            self.fetch_token_info().await;
        }
        if self.selected_address().is_none() {
            self.auto_select().await;
        } else {
            self.establish_missing().await;
        }
    }

    /// Submit `Vesting::vest` for `address` and stream human-readable
    /// progress. Every failure ends the stream with an `Error: ...` line.
    pub fn claim_vested(&self, address: &str) -> BoxStream<'static, String> {
        let chain = self.chain.clone();
        let wallet = self.wallet.clone();
        let address = address.to_string();

        let submission = async move {
            let chain = chain.ok_or_else(|| SessionError::ChainNotConnected.to_string())?;
            let wallet = wallet.ok_or_else(|| SessionError::WalletNotConnected.to_string())?;
            let signer = wallet.signer(&address).map_err(|e| e.to_string())?;
            chain
                .submit_extrinsic(ExtrinsicCall::VESTING_VEST, &address, signer)
                .await
                .map_err(|e| e.to_string())
        };

        stream::once(submission)
            .flat_map(|result| match result {
                Ok(progress) => status_messages(progress),
                Err(message) => {
                    tracing::warn!(error = %message, "Vesting claim failed");
                    stream::iter([format!("Error: {message}")]).boxed()
                }
            })
            .boxed()
    }

    async fn auto_select(&mut self) {
        if self.selected_address().is_some() {
            return;
        }
        let first = self.publishers.accounts.borrow().first().cloned();
        if let Some(account) = first {
            self.switch_to(account).await;
        }
    }

    async fn switch_to(&mut self, account: WalletAccount) -> SelectedAccount {
        self.release_all();
        let selected = SelectedAccount {
            address: account.address,
            display_name: account.display_name,
        };
        tracing::info!(address = %selected.address, name = %selected.display_name, "Selected account");
        self.publishers.selected.send_replace(Some(selected.clone()));
        self.establish_missing().await;
        selected
    }

    async fn fetch_token_info(&mut self) {
        let Some(chain) = self.chain.clone() else {
            return;
        };
        match chain.chain_properties().await {
            Ok(token) => {
                tracing::info!(symbol = %token.symbol, decimals = token.decimals, "Token info");
                self.publishers.token.send_replace(Some(token));
            }
            Err(e) => tracing::warn!(error = %e, "Failed to fetch chain properties"),
        }
    }

    /// Subscribe every source that is not live yet. Requires a chain client
    /// and a selected account.
    async fn establish_missing(&mut self) {
        self.prune_closed();
        let (Some(chain), Some(address)) = (self.chain.clone(), self.selected_address()) else {
            self.chain_unreachable = false;
            return;
        };

        let (mut attempted, mut failed) = (0, 0);
        for source in DataSource::ALL {
            if self.sources.iter().any(|live| live.source == source) {
                continue;
            }
            attempted += 1;
            match self.establish(chain.as_ref(), source, &address).await {
                Ok(live) => self.sources.push(live),
                Err(e) => {
                    failed += 1;
                    tracing::warn!(%source, %address, error = %e, "Failed to subscribe");
                }
            }
        }
        self.chain_unreachable = attempted > 0 && failed == attempted;
    }

    /// Drop sources whose feed ended without a release. Their pumps already
    /// reset the published values.
    fn prune_closed(&mut self) {
        let (closed, open): (Vec<_>, Vec<_>) =
            self.sources.drain(..).partition(LiveSource::is_closed);
        self.sources = open;
        for live in closed {
            let source = live.source;
            live.release();
            tracing::debug!(%source, "Pruned closed subscription");
        }
    }

    async fn establish(
        &self,
        chain: &dyn ChainClient,
        source: DataSource,
        address: &str,
    ) -> Result<LiveSource, ChainError> {
        let publishers = self.publishers.clone();
        let live = match source {
            DataSource::Balances => {
                let subscription = chain.subscribe_balances(address).await?;
                LiveSource::spawn(source, subscription, publishers, |p, live, snapshot| {
                    publish(&p.balances, live, Some(snapshot))
                })
            }
            DataSource::StakingLedger => {
                // An account without a ledger publishes `None`.
                let subscription = chain.subscribe_staking_ledger(address).await?;
                LiveSource::spawn(source, subscription, publishers, |p, live, ledger| {
                    publish(&p.ledger, live, ledger)
                })
            }
            DataSource::SessionProgress => {
                let subscription = chain.subscribe_session_progress().await?;
                LiveSource::spawn(source, subscription, publishers, |p, live, progress| {
                    publish(&p.progress, live, Some(progress))
                })
            }
        };
        tracing::debug!(%source, address, "Subscribed");
        Ok(live)
    }

    fn release_all(&mut self) {
        for live in self.sources.drain(..) {
            let source = live.source;
            live.release();
            self.publishers.reset(source);
            tracing::debug!(%source, "Released subscription");
        }
    }

    fn release_wallet_feed(&mut self) {
        if let Some((handle, pump)) = self.wallet_feed.take() {
            handle.unsubscribe();
            pump.abort();
        }
    }

    fn set_status(&self, update: impl FnOnce(&mut ConnectionStatus)) {
        self.publishers.status.send_modify(update);
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        self.release_all();
        self.release_wallet_feed();
    }
}

const STATUS_FEED_CLOSED: &str = "transaction status stream closed before finalization";

/// Human-readable progress of a claim, ending after the first terminal status.
/// A feed that stops short of one ends with an error line instead.
fn status_messages(progress: Subscription<TxStatus>) -> BoxStream<'static, String> {
    stream::unfold(Some(progress), |state| async move {
        let mut progress = state?;
        let Some(status) = progress.next_update().await else {
            tracing::warn!("Transaction status feed ended before a terminal status");
            return Some((format!("Error: {STATUS_FEED_CLOSED}"), None));
        };
        let next = (!status.is_terminal()).then_some(progress);
        Some((status_message(&status), next))
    })
    .boxed()
}

pub fn status_message(status: &TxStatus) -> String {
    match status {
        TxStatus::InBlock(hash) => format!("Transaction included at blockHash {hash}"),
        TxStatus::Finalized(hash) => format!("Transaction finalized at blockHash {hash}"),
        TxStatus::Error(message) | TxStatus::Invalid(message) | TxStatus::Dropped(message) => {
            format!("Error: {message}")
        }
        other => format!("Current status is {other}"),
    }
}
