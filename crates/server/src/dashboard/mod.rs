// SPDX-License-Identifier: GPL-3.0-or-later

//! Dashboard core: balance derivation, unlock projection, and the session
//! that keeps chain state live for the selected account.

pub mod balance;
pub mod session;
pub mod subscription;
pub mod types;
pub mod unlock;

pub use balance::Amount;
pub use session::{ConnectionStatus, DashboardSession, DashboardView, DataSource, SessionError};
pub use subscription::{Subscription, SubscriptionHandle};
pub use unlock::{UnlockEstimate, UnlockScheduler};
