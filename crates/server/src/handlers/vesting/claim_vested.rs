use crate::handlers::types::DashboardError;
use crate::state::AppState;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;

/// Handler for POST /vesting/claim
///
/// Submits `Vesting::vest` signed by the selected account and streams every
/// status line as an `event: status` server-sent event. The stream closes
/// after the transaction is finalized or fails.
pub async fn claim_vested(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, DashboardError> {
    let session = state.session.lock().await;
    let address = session
        .selected_address()
        .ok_or(DashboardError::NoAccountSelected)?;
    let progress = session.claim_vested(&address);
    drop(session);

    tracing::info!(%address, "Claiming vested funds");
    let events = progress.map(move |message| {
        tracing::debug!(%message, "Claim status");
        state.record_claim_status(&address, &message);
        Ok(Event::default().event("status").data(message))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
