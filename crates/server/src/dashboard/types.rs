//! Decoded chain records the dashboard works on.
//!
//! Every value here is immutable once built. A new push from the chain
//! replaces the whole record; nothing is patched in place.

use serde::{Serialize, Serializer};

/// Planck amounts go over the wire as decimal strings so that JSON readers
/// without 128-bit integers do not lose precision.
pub(crate) fn as_string<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Token metadata for the connected chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
}

/// A single balance lock (`Balances::Locks` entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceLock {
    /// Lock identifier rendered as text, e.g. `vesting` or `staking`
    pub id: String,
    #[serde(serialize_with = "as_string")]
    pub amount: u128,
}

/// A vesting schedule from `Vesting::Vesting`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingSchedule {
    /// Tokens locked at the start of the schedule
    #[serde(serialize_with = "as_string")]
    pub locked: u128,
    /// Tokens unlocked per block
    #[serde(serialize_with = "as_string")]
    pub per_block: u128,
    /// Block at which unlocking begins
    pub starting_block: u32,
}

impl VestingSchedule {
    /// Amount still locked by this schedule at block `now`.
    pub fn locked_at(&self, now: u32) -> u128 {
        if now <= self.starting_block {
            return self.locked;
        }
        let elapsed = u128::from(now - self.starting_block);
        let vested = self.per_block.saturating_mul(elapsed);
        self.locked.saturating_sub(vested)
    }
}

/// Balance state of one account, in planck.
///
/// Invariants (chain-provided):
/// `available_balance <= free_balance` and
/// `vested_claimable <= vested_balance <= vesting_total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalanceSnapshot {
    #[serde(serialize_with = "as_string")]
    pub free_balance: u128,
    #[serde(serialize_with = "as_string")]
    pub reserved_balance: u128,
    #[serde(serialize_with = "as_string")]
    pub locked_balance: u128,
    #[serde(serialize_with = "as_string")]
    pub available_balance: u128,
    pub locked_breakdown: Vec<BalanceLock>,
    #[serde(serialize_with = "as_string")]
    pub vested_balance: u128,
    #[serde(serialize_with = "as_string")]
    pub vested_claimable: u128,
    #[serde(serialize_with = "as_string")]
    pub vesting_locked: u128,
    #[serde(serialize_with = "as_string")]
    pub vesting_total: u128,
    pub vesting: Vec<VestingSchedule>,
}

/// A chunk of stake waiting for its unbonding era.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockChunk {
    #[serde(serialize_with = "as_string")]
    pub value: u128,
    pub era: u32,
}

/// `Staking::Ledger` for an account. `active <= total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingLedger {
    #[serde(serialize_with = "as_string")]
    pub total: u128,
    #[serde(serialize_with = "as_string")]
    pub active: u128,
    pub unlocking: Vec<UnlockChunk>,
}

/// Era progress used to project unlock dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub active_era: u32,
    /// Era length in blocks
    pub era_length: u64,
    /// Unix timestamp in milliseconds
    pub active_era_start: u64,
}

/// The account the dashboard is currently looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedAccount {
    pub address: String,
    pub display_name: String,
}
