use crate::dashboard::types::SelectedAccount;
use crate::extractors::JsonBody;
use crate::handlers::types::DashboardError;
use crate::state::AppState;
use axum::{Json, extract::State};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectAccountRequest {
    pub address: String,
}

/// Handler for POST /wallet/select
///
/// Switches the dashboard to another wallet account. The previous account's
/// subscriptions are released before the new ones are opened, so the views
/// show placeholders until the first values for the new account arrive.
pub async fn select_account(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SelectAccountRequest>,
) -> Result<Json<SelectedAccount>, DashboardError> {
    let mut session = state.session.lock().await;
    let selected = session.select_account(&request.address).await?;
    drop(session);

    // A new account starts with a clean claim status.
    state.clear_claim_status();
    Ok(Json(selected))
}
