// SPDX-License-Identifier: GPL-3.0-or-later

use crate::state::AppState;
use axum::Router;

pub mod account;
pub mod health;
pub mod staking;
pub mod token;
pub mod vesting;
pub mod wallet;

pub const API_VERSION: &str = "/v1";

/// Every dashboard route, relative to [`API_VERSION`].
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(token::routes())
        .merge(wallet::routes())
        .merge(account::routes())
        .merge(vesting::routes())
        .merge(staking::routes())
}
