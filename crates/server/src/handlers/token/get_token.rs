use crate::dashboard::types::TokenInfo;
use crate::handlers::types::DashboardError;
use crate::state::AppState;
use axum::{Json, extract::State};

/// Handler for GET /token
///
/// Returns the chain's token symbol and decimals, or 503 until the chain
/// has reported its properties.
pub async fn get_token(State(state): State<AppState>) -> Result<Json<TokenInfo>, DashboardError> {
    state
        .view
        .token()
        .map(Json)
        .ok_or(DashboardError::ChainUnavailable)
}
