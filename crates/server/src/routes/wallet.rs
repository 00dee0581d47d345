use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers::wallet, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallet/accounts", get(wallet::get_accounts))
        .route("/wallet/select", post(wallet::select_account))
}
