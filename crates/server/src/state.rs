// SPDX-License-Identifier: GPL-3.0-or-later

use crate::dashboard::{DashboardSession, DashboardView};
use config::DashboardConfig;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    /// Writers (account selection, refresh, chain reconnects) serialize here.
    pub session: Arc<Mutex<DashboardSession>>,
    /// Lock-free reads of the session's published state.
    pub view: DashboardView,
    /// Latest message of the most recent vesting claim.
    claim_status: Arc<watch::Sender<Option<ClaimStatus>>>,
}

/// A claim's status line, tagged with the account that signed it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClaimStatus {
    address: String,
    message: String,
}

impl AppState {
    pub fn new(config: DashboardConfig, session: DashboardSession) -> Self {
        let view = session.view();
        Self {
            config: Arc::new(config),
            session: Arc::new(Mutex::new(session)),
            view,
            claim_status: Arc::new(watch::channel(None).0),
        }
    }

    /// Record `message` for a claim signed by `address`. Dropped when another
    /// account is selected by now, so a claim still running after a switch
    /// cannot leak into the new account's view.
    pub fn record_claim_status(&self, address: &str, message: &str) {
        let view = &self.view;
        self.claim_status.send_if_modified(|slot| {
            let selected = view.selected_account();
            if selected.is_none_or(|account| account.address != address) {
                return false;
            }
            *slot = Some(ClaimStatus {
                address: address.to_string(),
                message: message.to_string(),
            });
            true
        });
    }

    /// Latest claim status for `address`, if the most recent claim was its own.
    pub fn claim_status_for(&self, address: &str) -> Option<String> {
        self.claim_status
            .borrow()
            .as_ref()
            .filter(|status| status.address == address)
            .map(|status| status.message.clone())
    }

    pub fn clear_claim_status(&self) {
        self.claim_status.send_replace(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::UnlockScheduler;
    use crate::test_fixtures::{self, ALICE, BOB, FakeChain};

    async fn state() -> AppState {
        let mut session = DashboardSession::new(UnlockScheduler::default());
        session.connect_chain(FakeChain::new()).await;
        session.connect_wallet(test_fixtures::dev_wallet()).await;
        AppState::new(DashboardConfig::default(), session)
    }

    #[tokio::test]
    async fn test_claim_status_belongs_to_signer() {
        let state = state().await;
        state.record_claim_status(ALICE, "Current status is Ready");
        assert_eq!(
            state.claim_status_for(ALICE).as_deref(),
            Some("Current status is Ready")
        );
        assert!(state.claim_status_for(BOB).is_none());
    }

    #[tokio::test]
    async fn test_status_after_switch_is_dropped() {
        let state = state().await;
        state.record_claim_status(ALICE, "Current status is Ready");

        state.session.lock().await.select_account(BOB).await.unwrap();
        state.clear_claim_status();
        state.record_claim_status(ALICE, "Transaction finalized at blockHash 0x01");

        assert!(state.claim_status_for(BOB).is_none());
        assert!(state.claim_status_for(ALICE).is_none());
    }
}
