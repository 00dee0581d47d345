use crate::state::AppState;
use axum::{extract::State, response::Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub chain_connected: bool,
    pub wallet_connected: bool,
    pub selected_account: Option<String>,
}

/// Handler for GET /health
///
/// Always answers `ok`; the connection flags tell whether the dashboard has
/// anything to show yet.
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.view.status();
    Json(HealthResponse {
        status: "ok".to_string(),
        chain_connected: status.chain_connected,
        wallet_connected: status.wallet_connected,
        selected_account: state.view.selected_account().map(|account| account.address),
    })
}
