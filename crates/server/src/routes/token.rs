use axum::{Router, routing::get};

use crate::{handlers::token, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/token", get(token::get_token))
}
