use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers::vesting, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vesting", get(vesting::get_vesting))
        .route("/vesting/claim", post(vesting::claim_vested))
}
