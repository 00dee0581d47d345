use axum::{Router, routing::get};

use crate::{handlers::account, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/account", get(account::get_account))
}
