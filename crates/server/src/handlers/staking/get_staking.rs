use crate::dashboard::balance::{self, Amount};
use crate::dashboard::types::{SelectedAccount, SessionProgress, StakingLedger, TokenInfo};
use crate::dashboard::{UnlockEstimate, UnlockScheduler};
use crate::handlers::types::DisplayAmount;
use crate::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;

/// One unlocking chunk with its projected unlock date.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkView {
    pub amount: DisplayAmount,
    pub era: u32,
    pub estimated_unlock: String,
    /// Unix milliseconds, `null` while session progress is unknown
    pub estimated_unlock_at: Option<i64>,
}

/// Progress bar segments in basis points of the staking total.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StakingShares {
    pub active: Option<u32>,
    pub unlocking: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingResponse {
    pub account: Option<SelectedAccount>,
    pub total: DisplayAmount,
    pub active: DisplayAmount,
    pub unlocking: DisplayAmount,
    pub shares: StakingShares,
    pub chunks: Vec<ChunkView>,
    /// `null` when the account has no staking ledger
    pub ledger: Option<StakingLedger>,
    pub session: Option<SessionProgress>,
}

impl StakingResponse {
    pub fn build(
        account: Option<SelectedAccount>,
        token: Option<&TokenInfo>,
        ledger: Option<StakingLedger>,
        session: Option<SessionProgress>,
        scheduler: &UnlockScheduler,
    ) -> Self {
        let total = ledger
            .as_ref()
            .map_or(Amount::Unavailable, |l| Amount::from_planck(l.total));
        let active = ledger
            .as_ref()
            .map_or(Amount::Unavailable, |l| Amount::from_planck(l.active));
        let unlocking = balance::total_unlocking(ledger.as_ref());

        let chunks = ledger
            .iter()
            .flat_map(|l| l.unlocking.iter())
            .map(|chunk| {
                let estimate = scheduler.estimate(chunk.era, session.as_ref());
                ChunkView {
                    amount: DisplayAmount::new(Amount::from_planck(chunk.value), token),
                    era: chunk.era,
                    estimated_unlock: estimate.to_string(),
                    estimated_unlock_at: match estimate {
                        UnlockEstimate::At(date) => Some(date.timestamp_millis()),
                        UnlockEstimate::Calculating => None,
                    },
                }
            })
            .collect();

        Self {
            account,
            shares: StakingShares {
                active: balance::share_bps(active, total),
                unlocking: balance::share_bps(unlocking, total),
            },
            total: DisplayAmount::new(total, token),
            active: DisplayAmount::new(active, token),
            unlocking: DisplayAmount::new(unlocking, token),
            chunks,
            ledger,
            session,
        }
    }
}

/// Handler for GET /staking
///
/// Staking ledger of the selected account with an estimated unlock date for
/// every unbonding chunk.
pub async fn get_staking(State(state): State<AppState>) -> Json<StakingResponse> {
    let view = &state.view;
    let token = view.token();
    Json(StakingResponse::build(
        view.selected_account(),
        token.as_ref(),
        view.staking_ledger(),
        view.session_progress(),
        &view.scheduler(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::unlock::CALCULATING_PLACEHOLDER;
    use crate::test_fixtures;

    #[test]
    fn test_staking_view_with_progress() {
        let dot = test_fixtures::dot();
        let response = StakingResponse::build(
            None,
            Some(&dot),
            Some(test_fixtures::unbonding_ledger()),
            Some(test_fixtures::progress()),
            &UnlockScheduler::default(),
        );

        assert_eq!(response.unlocking.planck, Amount::Planck(500));
        assert_eq!(
            response.shares,
            StakingShares {
                active: Some(6666),
                unlocking: Some(3333),
            }
        );
        assert_eq!(response.chunks.len(), 2);

        // Two eras of 100 blocks at 6s each after the era start.
        let start = test_fixtures::progress().active_era_start as i64;
        assert_eq!(response.chunks[0].era, 12);
        assert_eq!(response.chunks[0].estimated_unlock_at, Some(start + 1_200_000));
        assert_eq!(response.chunks[1].estimated_unlock_at, Some(start + 1_800_000));
        assert!(response.chunks[0].estimated_unlock.ends_with("UTC"));
    }

    #[test]
    fn test_staking_view_without_progress() {
        let dot = test_fixtures::dot();
        let response = StakingResponse::build(
            None,
            Some(&dot),
            Some(test_fixtures::unbonding_ledger()),
            None,
            &UnlockScheduler::default(),
        );

        for chunk in &response.chunks {
            assert_eq!(chunk.estimated_unlock, CALCULATING_PLACEHOLDER);
            assert_eq!(chunk.estimated_unlock_at, None);
        }
    }

    #[test]
    fn test_staking_view_without_ledger() {
        let dot = test_fixtures::dot();
        let response = StakingResponse::build(
            None,
            Some(&dot),
            None,
            Some(test_fixtures::progress()),
            &UnlockScheduler::default(),
        );

        assert_eq!(response.unlocking.formatted, "0.0000 DOT");
        assert!(response.total.planck.value().is_none());
        assert!(response.chunks.is_empty());
        assert!(response.ledger.is_none());
        assert_eq!(response.shares.unlocking, None);
    }
}
