use axum::{Router, routing::get};

use crate::{handlers::staking, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/staking", get(staking::get_staking))
}
