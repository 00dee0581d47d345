use crate::state::AppState;
use crate::wallet::WalletAccount;
use axum::{Json, extract::State};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccountsResponse {
    pub app_name: String,
    pub accounts: Vec<WalletAccount>,
    pub selected: Option<String>,
}

/// Handler for GET /wallet/accounts
///
/// Lists the accounts the wallet currently provides and the address the
/// dashboard is following.
pub async fn get_accounts(State(state): State<AppState>) -> Json<WalletAccountsResponse> {
    Json(WalletAccountsResponse {
        app_name: state.config.wallet.app_name.clone(),
        accounts: state.view.accounts(),
        selected: state.view.selected_account().map(|account| account.address),
    })
}
