// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::Duration;

/// How often the session retries whatever is missing: token info, failed
/// subscriptions, and the initial account selection.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(15);

/// Delay between attempts to reach the node at startup.
pub const CHAIN_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Upper bound for the startup retry delay.
pub const CHAIN_RETRY_MAX_INTERVAL: Duration = Duration::from_secs(60);
