// SPDX-License-Identifier: GPL-3.0-or-later

use crate::{
    logging::http_logger_middleware,
    routes::{self, API_VERSION},
    state::AppState,
};
use axum::{
    Router,
    http::{Method, header},
    middleware,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest(API_VERSION, routes::routes())
        .layer(middleware::from_fn(http_logger_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
