use crate::dashboard::balance::{self, Amount};
use crate::dashboard::types::{AccountBalanceSnapshot, SelectedAccount, TokenInfo, VestingSchedule};
use crate::handlers::types::DisplayAmount;
use crate::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;

/// Progress bar segments in basis points of the vesting total.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VestingShares {
    pub claimed: Option<u32>,
    pub claimable: Option<u32>,
    pub vesting: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingRaw {
    pub vested_balance: DisplayAmount,
    pub vesting_locked: DisplayAmount,
    pub vested_claimable: DisplayAmount,
    pub vesting_total: DisplayAmount,
    pub schedules: Vec<VestingSchedule>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingResponse {
    pub account: Option<SelectedAccount>,
    pub total: DisplayAmount,
    pub claimed: DisplayAmount,
    pub claimable: DisplayAmount,
    pub vesting: DisplayAmount,
    pub shares: VestingShares,
    /// `null` while no balance snapshot is known
    pub raw: Option<VestingRaw>,
    /// Latest message from the most recent claim
    pub claim_status: Option<String>,
}

impl VestingResponse {
    pub fn build(
        account: Option<SelectedAccount>,
        token: Option<&TokenInfo>,
        snapshot: Option<&AccountBalanceSnapshot>,
        claim_status: Option<String>,
    ) -> Self {
        let total = snapshot.map_or(Amount::Unavailable, |s| {
            Amount::from_planck(s.vesting_total)
        });
        let claimed = balance::amount_claimed(snapshot);
        let claimable = balance::amount_claimable(snapshot);
        let vesting = balance::amount_vesting(snapshot);

        let raw = snapshot.map(|s| VestingRaw {
            vested_balance: DisplayAmount::new(Amount::from_planck(s.vested_balance), token),
            vesting_locked: DisplayAmount::new(Amount::from_planck(s.vesting_locked), token),
            vested_claimable: DisplayAmount::new(Amount::from_planck(s.vested_claimable), token),
            vesting_total: DisplayAmount::new(Amount::from_planck(s.vesting_total), token),
            schedules: s.vesting.clone(),
        });

        Self {
            account,
            shares: VestingShares {
                claimed: balance::share_bps(claimed, total),
                claimable: balance::share_bps(claimable, total),
                vesting: balance::share_bps(vesting, total),
            },
            total: DisplayAmount::new(total, token),
            claimed: DisplayAmount::new(claimed, token),
            claimable: DisplayAmount::new(claimable, token),
            vesting: DisplayAmount::new(vesting, token),
            raw,
            claim_status,
        }
    }
}

/// Handler for GET /vesting
///
/// Splits the vesting total of the selected account into what was already
/// claimed, what can be claimed now and what is still vesting.
pub async fn get_vesting(State(state): State<AppState>) -> Json<VestingResponse> {
    let view = &state.view;
    let token = view.token();
    let snapshot = view.balances();
    let account = view.selected_account();
    let claim_status = account
        .as_ref()
        .and_then(|account| state.claim_status_for(&account.address));
    Json(VestingResponse::build(
        account,
        token.as_ref(),
        snapshot.as_ref(),
        claim_status,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::balance::LOADING_PLACEHOLDER;
    use crate::test_fixtures;

    #[test]
    fn test_vesting_breakdown() {
        let dot = test_fixtures::dot();
        let snapshot = test_fixtures::vesting_snapshot();
        let response = VestingResponse::build(None, Some(&dot), Some(&snapshot), None);

        assert_eq!(response.total.formatted, "70.0000 DOT");
        assert_eq!(response.claimed.formatted, "10.0000 DOT");
        assert_eq!(response.claimable.formatted, "20.0000 DOT");
        assert_eq!(response.vesting.formatted, "40.0000 DOT");
        assert_eq!(
            response.shares,
            VestingShares {
                claimed: Some(1428),
                claimable: Some(2857),
                vesting: Some(5714),
            }
        );

        let raw = response.raw.unwrap();
        assert_eq!(raw.vesting_locked.formatted, "40.0000 DOT");
        assert_eq!(raw.schedules.len(), 1);
    }

    #[test]
    fn test_vesting_without_snapshot() {
        let dot = test_fixtures::dot();
        let response = VestingResponse::build(None, Some(&dot), None, None);

        assert_eq!(response.claimable.formatted, LOADING_PLACEHOLDER);
        assert!(response.raw.is_none());
        assert_eq!(
            response.shares,
            VestingShares {
                claimed: None,
                claimable: None,
                vesting: None,
            }
        );
    }

    #[test]
    fn test_nothing_vesting_has_no_shares() {
        let dot = test_fixtures::dot();
        let mut snapshot = test_fixtures::vesting_snapshot();
        snapshot.vesting.clear();
        snapshot.vesting_total = 0;
        snapshot.vested_balance = 0;
        snapshot.vested_claimable = 0;
        let response = VestingResponse::build(None, Some(&dot), Some(&snapshot), None);

        assert_eq!(response.total.formatted, "0.0000 DOT");
        assert_eq!(response.shares.claimed, None);
    }
}
