use crate::dashboard::balance::{self, Amount};
use crate::dashboard::types::{AccountBalanceSnapshot, SelectedAccount, TokenInfo};
use crate::handlers::types::DisplayAmount;
use crate::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockView {
    pub id: String,
    pub amount: DisplayAmount,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// `null` when no account is selected
    pub account: Option<SelectedAccount>,
    pub token: Option<TokenInfo>,
    pub total: DisplayAmount,
    pub reserved: DisplayAmount,
    pub free: DisplayAmount,
    pub locked: DisplayAmount,
    pub locked_breakdown: Vec<LockView>,
    pub available: DisplayAmount,
}

impl AccountResponse {
    pub fn build(
        account: Option<SelectedAccount>,
        token: Option<TokenInfo>,
        snapshot: Option<&AccountBalanceSnapshot>,
    ) -> Self {
        let t = token.as_ref();
        let field = |get: fn(&AccountBalanceSnapshot) -> u128| {
            DisplayAmount::new(Amount::from(snapshot.map(get)), t)
        };

        let locked_breakdown = snapshot
            .map(|s| {
                s.locked_breakdown
                    .iter()
                    .map(|lock| LockView {
                        id: lock.id.clone(),
                        amount: DisplayAmount::new(Amount::from_planck(lock.amount), t),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            total: DisplayAmount::new(balance::total_balance(snapshot), t),
            reserved: field(|s| s.reserved_balance),
            free: field(|s| s.free_balance),
            locked: field(|s| s.locked_balance),
            locked_breakdown,
            available: field(|s| s.available_balance),
            account,
            token,
        }
    }
}

/// Handler for GET /account
///
/// Balance overview of the selected account. Every amount is a placeholder
/// until the first balance snapshot for the account arrives.
pub async fn get_account(State(state): State<AppState>) -> Json<AccountResponse> {
    let view = &state.view;
    let snapshot = view.balances();
    Json(AccountResponse::build(
        view.selected_account(),
        view.token(),
        snapshot.as_ref(),
    ))
}
