//! Types shared by the dashboard handlers.

use crate::dashboard::SessionError;
use crate::dashboard::balance::{self, Amount, LOADING_PLACEHOLDER};
use crate::dashboard::types::TokenInfo;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

// ================================================================================================
// Error Response Helpers
// ================================================================================================

/// Creates a JSON error response with the given status code and message.
fn error_response(status: StatusCode, message: String) -> axum::response::Response {
    let body = Json(json!({ "error": message }));
    (status, body).into_response()
}

/// Implements IntoResponse for error types with status code mapping.
///
/// Usage:
/// ```ignore
/// impl_error_response!(MyError,
///     MyError::NotFound(_) => NOT_FOUND,
///     _ => INTERNAL_SERVER_ERROR
/// );
/// ```
macro_rules! impl_error_response {
    ($error_type:ty, $($variant:pat => $status:ident),+ $(,)?) => {
        impl IntoResponse for $error_type {
            fn into_response(self) -> axum::response::Response {
                let status = match &self {
                    $($variant => StatusCode::$status,)+
                };
                error_response(status, self.to_string())
            }
        }
    };
}

// ================================================================================================
// Errors
// ================================================================================================

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("chain client unavailable")]
    ChainUnavailable,

    #[error("wallet not connected")]
    WalletNotConnected,

    #[error("no account selected")]
    NoAccountSelected,

    #[error("Account {0} is not provided by the wallet")]
    UnknownAccount(String),
}

impl From<SessionError> for DashboardError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::ChainNotConnected => DashboardError::ChainUnavailable,
            SessionError::WalletNotConnected => DashboardError::WalletNotConnected,
            SessionError::UnknownAccount(address) => DashboardError::UnknownAccount(address),
        }
    }
}

impl_error_response!(DashboardError,
    DashboardError::ChainUnavailable => SERVICE_UNAVAILABLE,
    DashboardError::WalletNotConnected => SERVICE_UNAVAILABLE,
    DashboardError::NoAccountSelected => BAD_REQUEST,
    DashboardError::UnknownAccount(_) => NOT_FOUND,
);

// ================================================================================================
// Display Types
// ================================================================================================

/// An amount in planck next to its rendering in token units.
///
/// `planck` is `null` while the amount is unknown. `formatted` carries the
/// loading placeholder until both the amount and the token are known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayAmount {
    pub planck: Amount,
    pub formatted: String,
}

impl DisplayAmount {
    pub fn new(amount: Amount, token: Option<&TokenInfo>) -> Self {
        let formatted = match token {
            Some(token) => balance::format_with_symbol(amount, token),
            None => LOADING_PLACEHOLDER.to_string(),
        };
        Self {
            planck: amount,
            formatted,
        }
    }
}
