// SPDX-License-Identifier: GPL-3.0-or-later

use config::{Args, DashboardConfig};
use std::sync::Arc;
use std::time::Duration;
use unlock_my_dot::{
    app,
    chain::RpcChainClient,
    consts::{CHAIN_RETRY_INTERVAL, CHAIN_RETRY_MAX_INTERVAL, REFRESH_INTERVAL},
    dashboard::{DashboardSession, UnlockScheduler},
    logging,
    state::AppState,
    wallet::KeyringWallet,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse_args();
    let mut config = DashboardConfig::from_env_file(&args.env_file)?;
    if let Some(url) = args.url {
        config.substrate.url = url;
    }

    let _log_guard = logging::init_with_config(&config.log)?;
    tracing::info!("Log level: {}", config.log.level);
    tracing::info!("Substrate URL: {}", config.substrate.url);

    let mut session = DashboardSession::new(UnlockScheduler::new(config.chain.block_time()));
    let wallet = KeyringWallet::from_config(&config.wallet)?;
    session.connect_wallet(Arc::new(wallet)).await;

    let state = AppState::new(config, session);
    tokio::spawn(connect_chain(state.clone()));
    tokio::spawn(refresh_periodically(state.clone()));

    let addr = format!(
        "{}:{}",
        state.config.express.bind_host, state.config.express.port
    );
    let app = app::create_app(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Starting server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Keep trying the node until it answers, backing off between attempts.
async fn connect_chain(state: AppState) {
    let mut delay = CHAIN_RETRY_INTERVAL;
    loop {
        match RpcChainClient::connect(&state.config.substrate, &state.config.chain).await {
            Ok(client) => {
                state.session.lock().await.connect_chain(Arc::new(client)).await;
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, retry_in = ?delay, "Node not reachable");
                tokio::time::sleep(delay).await;
                delay = next_delay(delay);
            }
        }
    }
}

fn next_delay(delay: Duration) -> Duration {
    delay.saturating_mul(2).min(CHAIN_RETRY_MAX_INTERVAL)
}

/// Refresh on every tick. A chain whose feeds can no longer be subscribed is
/// dropped and the connect loop starts over.
async fn refresh_periodically(state: AppState) {
    let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let mut session = state.session.lock().await;
        session.refresh().await;
        if session.chain_unreachable() {
            tracing::warn!("Chain feeds cannot be re-established, reconnecting");
            session.disconnect_chain();
            drop(session);
            tokio::spawn(connect_chain(state.clone()));
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
