// SPDX-License-Identifier: GPL-3.0-or-later

//! Balance derivation and formatting.
//!
//! Pure functions over decoded chain records. Missing inputs are modelled by
//! [`Amount::Unavailable`], which propagates through arithmetic instead of
//! collapsing to zero, so "no snapshot yet" is never confused with "zero".

use super::types::{AccountBalanceSnapshot, StakingLedger, TokenInfo};
use serde::{Serialize, Serializer};
use std::ops::{Add, Sub};

/// Placeholder rendered for amounts that are not available yet.
pub const LOADING_PLACEHOLDER: &str = "Loading Balance...";

/// Number of fractional digits every formatted amount carries.
pub const DISPLAY_PRECISION: u32 = 4;

/// A planck amount that may not be known yet.
///
/// Derived values are signed: a negative result means the inputs broke a
/// chain invariant, and it is rendered as such rather than hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Amount {
    #[default]
    Unavailable,
    Planck(i128),
}

impl Amount {
    pub const ZERO: Amount = Amount::Planck(0);

    /// Lift an on-chain balance. Values above `i128::MAX` cannot be
    /// represented and become unavailable.
    pub fn from_planck(value: u128) -> Self {
        i128::try_from(value).map_or(Amount::Unavailable, Amount::Planck)
    }

    pub fn value(self) -> Option<i128> {
        match self {
            Amount::Unavailable => None,
            Amount::Planck(value) => Some(value),
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Amount::Planck(_))
    }
}

impl From<Option<u128>> for Amount {
    fn from(value: Option<u128>) -> Self {
        value.map_or(Amount::Unavailable, Amount::from_planck)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        match (self, rhs) {
            (Amount::Planck(a), Amount::Planck(b)) => {
                a.checked_add(b).map_or(Amount::Unavailable, Amount::Planck)
            }
            _ => Amount::Unavailable,
        }
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        match (self, rhs) {
            (Amount::Planck(a), Amount::Planck(b)) => {
                a.checked_sub(b).map_or(Amount::Unavailable, Amount::Planck)
            }
            _ => Amount::Unavailable,
        }
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, |acc, amount| acc + amount)
    }
}

/// Unavailable amounts serialize as `null`, known ones as decimal strings.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Amount::Unavailable => serializer.serialize_none(),
            Amount::Planck(value) => serializer.collect_str(value),
        }
    }
}

// ================================================================================================
// Derivations
// ================================================================================================

/// `free + reserved`.
pub fn total_balance(snapshot: Option<&AccountBalanceSnapshot>) -> Amount {
    match snapshot {
        Some(s) => Amount::from_planck(s.free_balance) + Amount::from_planck(s.reserved_balance),
        None => Amount::Unavailable,
    }
}

/// Vested funds that were already claimed: `vested_balance - vested_claimable`.
pub fn amount_claimed(snapshot: Option<&AccountBalanceSnapshot>) -> Amount {
    match snapshot {
        Some(s) => {
            Amount::from_planck(s.vested_balance) - Amount::from_planck(s.vested_claimable)
        }
        None => Amount::Unavailable,
    }
}

/// Vested funds that can be claimed right now.
pub fn amount_claimable(snapshot: Option<&AccountBalanceSnapshot>) -> Amount {
    snapshot.map_or(Amount::Unavailable, |s| {
        Amount::from_planck(s.vested_claimable)
    })
}

/// Funds still vesting: `vesting_total - vested_balance`.
pub fn amount_vesting(snapshot: Option<&AccountBalanceSnapshot>) -> Amount {
    match snapshot {
        Some(s) => Amount::from_planck(s.vesting_total) - Amount::from_planck(s.vested_balance),
        None => Amount::Unavailable,
    }
}

/// Sum of all unlocking chunks. An absent ledger has nothing unlocking.
pub fn total_unlocking(ledger: Option<&StakingLedger>) -> Amount {
    ledger.map_or(Amount::ZERO, |l| {
        l.unlocking
            .iter()
            .map(|chunk| Amount::from_planck(chunk.value))
            .sum()
    })
}

/// Share of `part` in `whole` in basis points (1/100 of a percent).
///
/// Used for progress bars; `None` when either side is unknown or `whole`
/// is not positive.
pub fn share_bps(part: Amount, whole: Amount) -> Option<u32> {
    let (part, whole) = (part.value()?, whole.value()?);
    if whole <= 0 {
        return None;
    }
    let clamped = part.clamp(0, whole);
    let bps = match clamped.checked_mul(10_000) {
        Some(scaled) => scaled / whole,
        // Too large to scale exactly; the coarser ratio is fine for a progress bar.
        None => clamped / (whole / 10_000),
    };
    u32::try_from(bps.min(10_000)).ok()
}

// ================================================================================================
// Formatting
// ================================================================================================

/// Render `amount` in token units with exactly four fractional digits.
///
/// Scaling uses exact integer arithmetic and rounds half away from zero.
/// Unavailable amounts render as [`LOADING_PLACEHOLDER`].
pub fn format(amount: Amount, token: &TokenInfo) -> String {
    let Some(value) = amount.value() else {
        return LOADING_PLACEHOLDER.to_string();
    };

    let negative = value < 0;
    let (integer, fraction) = split_display(value.unsigned_abs(), u32::from(token.decimals));
    let sign = if negative && (integer != 0 || fraction != 0) {
        "-"
    } else {
        ""
    };

    format!(
        "{sign}{integer}.{fraction:0width$}",
        width = DISPLAY_PRECISION as usize
    )
}

/// Like [`format`], followed by the token symbol.
pub fn format_with_symbol(amount: Amount, token: &TokenInfo) -> String {
    if amount.is_available() {
        format!("{} {}", format(amount, token), token.symbol)
    } else {
        LOADING_PLACEHOLDER.to_string()
    }
}

/// Split `magnitude / 10^decimals` into its integer part and the first
/// [`DISPLAY_PRECISION`] fractional digits.
fn split_display(magnitude: u128, decimals: u32) -> (u128, u128) {
    let unit = 10u128.pow(DISPLAY_PRECISION);

    if decimals <= DISPLAY_PRECISION {
        let divisor = 10u128.pow(decimals);
        let fraction = (magnitude % divisor) * 10u128.pow(DISPLAY_PRECISION - decimals);
        return (magnitude / divisor, fraction);
    }

    let Some(divisor) = 10u128.checked_pow(decimals - DISPLAY_PRECISION) else {
        // divisor would exceed 2^128, more than twice any magnitude: rounds to zero
        return (0, 0);
    };

    let mut scaled = magnitude / divisor;
    let remainder = magnitude % divisor;
    if remainder >= divisor - remainder {
        scaled += 1;
    }
    (scaled / unit, scaled % unit)
}
