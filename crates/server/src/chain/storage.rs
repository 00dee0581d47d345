//! Raw storage access: keys, SCALE layouts, and snapshot assembly.
//!
//! Values are read straight from the node's storage and decoded against the
//! layouts of current Polkadot runtimes. Missing entries decode to their
//! chain defaults (zero balances, no locks, no schedules).

use crate::dashboard::types::{
    AccountBalanceSnapshot, BalanceLock, SessionProgress, StakingLedger, UnlockChunk,
    VestingSchedule,
};
use parity_scale_codec::Decode;
use serde::Deserialize;
use sp_crypto_hashing::{blake2_128, twox_128};
use std::collections::HashMap;

use super::ChainError;

/// Lock id placed by the vesting pallet, with padding trimmed.
pub const VESTING_LOCK_ID: &str = "vesting";

// ================================================================================================
// Storage Keys
// ================================================================================================

/// `twox128(pallet) ++ twox128(item)`
pub fn plain_key(pallet: &str, item: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(&twox_128(pallet.as_bytes()));
    key.extend_from_slice(&twox_128(item.as_bytes()));
    key
}

/// `twox128(pallet) ++ twox128(item) ++ blake2_128_concat(account)`
pub fn account_key(pallet: &str, item: &str, account: &[u8; 32]) -> Vec<u8> {
    let mut key = plain_key(pallet, item);
    key.reserve(16 + account.len());
    key.extend_from_slice(&blake2_128(account));
    key.extend_from_slice(account);
    key
}

pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn from_hex(value: &str) -> Result<Vec<u8>, ChainError> {
    hex::decode(value.trim_start_matches("0x"))
        .map_err(|e| ChainError::InvalidChangeSet(format!("bad hex '{value}': {e}")))
}

/// The storage keys backing one account's balance snapshot.
#[derive(Debug, Clone)]
pub struct BalanceKeys {
    pub account: Vec<u8>,
    pub locks: Vec<u8>,
    pub vesting: Vec<u8>,
    pub block_number: Vec<u8>,
}

impl BalanceKeys {
    pub fn new(account: &[u8; 32]) -> Self {
        Self {
            account: account_key("System", "Account", account),
            locks: account_key("Balances", "Locks", account),
            vesting: account_key("Vesting", "Vesting", account),
            block_number: plain_key("System", "Number"),
        }
    }

    pub fn all(&self) -> Vec<Vec<u8>> {
        vec![
            self.account.clone(),
            self.locks.clone(),
            self.vesting.clone(),
            self.block_number.clone(),
        ]
    }
}

pub fn ledger_key(account: &[u8; 32]) -> Vec<u8> {
    account_key("Staking", "Ledger", account)
}

pub fn active_era_key() -> Vec<u8> {
    plain_key("Staking", "ActiveEra")
}

// ================================================================================================
// Change Sets
// ================================================================================================

/// One notification from `state_subscribeStorage`.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageChangeSet {
    pub block: String,
    pub changes: Vec<(String, Option<String>)>,
}

/// Latest known value of every watched key. `None` means the key is empty.
#[derive(Debug, Default)]
pub struct StorageCache {
    values: HashMap<Vec<u8>, Option<Vec<u8>>>,
}

impl StorageCache {
    pub fn apply(&mut self, change_set: &StorageChangeSet) -> Result<(), ChainError> {
        for (key, value) in &change_set.changes {
            let key = from_hex(key)?;
            let value = value.as_deref().map(from_hex).transpose()?;
            self.values.insert(key, value);
        }
        Ok(())
    }

    /// Whether a change set has reported `key` at all, empty or not.
    pub fn has_seen(&self, key: &[u8]) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.values.get(key).and_then(|value| value.as_deref())
    }

    /// Decode `key`, falling back to `T::default()` when it is empty.
    pub fn decode_or_default<T: Decode + Default>(
        &self,
        key: &[u8],
        what: &'static str,
    ) -> Result<T, ChainError> {
        match self.get(key) {
            Some(bytes) => decode(bytes, what),
            None => Ok(T::default()),
        }
    }
}

fn decode<T: Decode>(mut bytes: &[u8], what: &'static str) -> Result<T, ChainError> {
    T::decode(&mut bytes).map_err(|source| ChainError::DecodeFailed { what, source })
}

// ================================================================================================
// SCALE Decode Types
// ================================================================================================

#[derive(Debug, Clone, Default, Decode)]
pub struct AccountData {
    pub free: u128,
    pub reserved: u128,
    pub frozen: u128,
    pub flags: u128,
}

/// `frame_system::AccountInfo`
#[derive(Debug, Clone, Default, Decode)]
pub struct AccountInfo {
    pub nonce: u32,
    pub consumers: u32,
    pub providers: u32,
    pub sufficients: u32,
    pub data: AccountData,
}

#[derive(Debug, Clone, Decode)]
struct RawBalanceLock {
    id: [u8; 8],
    amount: u128,
    #[allow(dead_code)]
    reasons: u8,
}

#[derive(Debug, Clone, Decode)]
struct RawVestingInfo {
    locked: u128,
    per_block: u128,
    starting_block: u32,
}

#[derive(Debug, Clone, Decode)]
struct RawUnlockChunk {
    #[codec(compact)]
    value: u128,
    #[codec(compact)]
    era: u32,
}

/// Leading fields of `pallet_staking::StakingLedger`. Trailing fields vary
/// between runtimes and are left undecoded.
#[derive(Debug, Clone, Decode)]
struct RawStakingLedger {
    #[allow(dead_code)]
    stash: [u8; 32],
    #[codec(compact)]
    total: u128,
    #[codec(compact)]
    active: u128,
    unlocking: Vec<RawUnlockChunk>,
}

/// `pallet_staking::ActiveEraInfo`
#[derive(Debug, Clone, Decode)]
pub struct ActiveEraInfo {
    pub index: u32,
    /// Milliseconds; `None` until the first block of the era is authored
    pub start: Option<u64>,
}

/// Render a lock id as text, e.g. `b"vesting "` as `vesting`.
pub fn lock_id_to_string(id: &[u8; 8]) -> String {
    String::from_utf8_lossy(id)
        .trim_end_matches(['\0', ' '])
        .to_string()
}

pub fn decode_locks(bytes: &[u8]) -> Result<Vec<BalanceLock>, ChainError> {
    let raw: Vec<RawBalanceLock> = decode(bytes, "balance locks")?;
    Ok(raw
        .into_iter()
        .map(|lock| BalanceLock {
            id: lock_id_to_string(&lock.id),
            amount: lock.amount,
        })
        .collect())
}

pub fn decode_vesting(bytes: &[u8]) -> Result<Vec<VestingSchedule>, ChainError> {
    let raw: Vec<RawVestingInfo> = decode(bytes, "vesting schedules")?;
    Ok(raw
        .into_iter()
        .map(|info| VestingSchedule {
            locked: info.locked,
            per_block: info.per_block,
            starting_block: info.starting_block,
        })
        .collect())
}

pub fn decode_ledger(bytes: &[u8]) -> Result<StakingLedger, ChainError> {
    let raw: RawStakingLedger = decode(bytes, "staking ledger")?;
    Ok(StakingLedger {
        total: raw.total,
        active: raw.active,
        unlocking: raw
            .unlocking
            .into_iter()
            .map(|chunk| UnlockChunk {
                value: chunk.value,
                era: chunk.era,
            })
            .collect(),
    })
}

pub fn decode_active_era(bytes: &[u8]) -> Result<ActiveEraInfo, ChainError> {
    decode(bytes, "active era")
}

// ================================================================================================
// Snapshot Assembly
// ================================================================================================

/// Build the balance snapshot from raw account data at block `now`.
pub fn build_snapshot(
    account: &AccountData,
    locks: Vec<BalanceLock>,
    vesting: Vec<VestingSchedule>,
    now: u32,
) -> AccountBalanceSnapshot {
    let max_lock = locks.iter().map(|lock| lock.amount).max().unwrap_or(0);
    let locked_balance = account.frozen.max(max_lock);
    // Reserved funds count towards the frozen amount.
    let untouchable = locked_balance.saturating_sub(account.reserved);
    let available_balance = account.free.saturating_sub(untouchable);

    let vesting_total: u128 = vesting
        .iter()
        .fold(0u128, |acc, schedule| acc.saturating_add(schedule.locked));
    let vesting_locked: u128 = vesting.iter().fold(0u128, |acc, schedule| {
        acc.saturating_add(schedule.locked_at(now))
    });
    let vesting_lock = locks
        .iter()
        .find(|lock| lock.id == VESTING_LOCK_ID)
        .map(|lock| lock.amount)
        .unwrap_or(0);

    AccountBalanceSnapshot {
        free_balance: account.free,
        reserved_balance: account.reserved,
        locked_balance,
        available_balance,
        locked_breakdown: locks,
        vested_balance: vesting_total.saturating_sub(vesting_locked),
        vested_claimable: vesting_lock.saturating_sub(vesting_locked),
        vesting_locked,
        vesting_total,
        vesting,
    }
}

/// Rebuild the snapshot for `keys` from everything cached so far.
///
/// Returns `None` until the first change set covering the account has arrived.
pub fn snapshot_from_cache(
    cache: &StorageCache,
    keys: &BalanceKeys,
) -> Result<Option<AccountBalanceSnapshot>, ChainError> {
    if !cache.has_seen(&keys.account) {
        return Ok(None);
    }

    let info: AccountInfo = cache.decode_or_default(&keys.account, "account info")?;
    let locks = match cache.get(&keys.locks) {
        Some(bytes) => decode_locks(bytes)?,
        None => Vec::new(),
    };
    let vesting = match cache.get(&keys.vesting) {
        Some(bytes) => decode_vesting(bytes)?,
        None => Vec::new(),
    };
    let now: u32 = cache.decode_or_default(&keys.block_number, "block number")?;

    Ok(Some(build_snapshot(&info.data, locks, vesting, now)))
}

/// `Some(None)` means the account has no ledger; `None` means nothing was
/// reported yet.
pub fn ledger_from_cache(
    cache: &StorageCache,
    key: &[u8],
) -> Result<Option<Option<StakingLedger>>, ChainError> {
    if !cache.has_seen(key) {
        return Ok(None);
    }
    cache.get(key).map(decode_ledger).transpose().map(Some)
}

/// Session progress, once the active era and its start are both known.
pub fn progress_from_cache(
    cache: &StorageCache,
    key: &[u8],
    era_length: u64,
) -> Result<Option<SessionProgress>, ChainError> {
    let Some(bytes) = cache.get(key) else {
        return Ok(None);
    };
    let era = decode_active_era(bytes)?;
    Ok(era.start.map(|start| SessionProgress {
        active_era: era.index,
        era_length,
        active_era_start: start,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parity_scale_codec::{Compact, Encode};

    const ALICE: [u8; 32] = [1u8; 32];

    fn change_set(changes: Vec<(Vec<u8>, Option<Vec<u8>>)>) -> StorageChangeSet {
        StorageChangeSet {
            block: "0x00".to_string(),
            changes: changes
                .into_iter()
                .map(|(k, v)| (to_hex(&k), v.map(|v| to_hex(&v))))
                .collect(),
        }
    }

    fn account_info(free: u128, reserved: u128, frozen: u128) -> Vec<u8> {
        (0u32, 0u32, 1u32, 0u32, free, reserved, frozen, 0u128).encode()
    }

    fn locks(entries: &[(&[u8; 8], u128)]) -> Vec<u8> {
        entries
            .iter()
            .map(|(id, amount)| (**id, *amount, 2u8))
            .collect::<Vec<_>>()
            .encode()
    }

    #[test]
    fn test_known_prefixes() {
        assert_eq!(
            to_hex(&plain_key("System", "Account")),
            "0x26aa394eea5630e07c48ae0c9558cef7b99d880ec681799c0cf30e8886371da9"
        );
        assert_eq!(
            to_hex(&plain_key("System", "Number")),
            "0x26aa394eea5630e07c48ae0c9558cef702a5c1b19ab7a04f536c519aca4983ac"
        );
        assert_eq!(
            to_hex(&active_era_key()),
            "0x5f3e4907f716ac89b6347d15ececedca487df464e44a534ba6b0cbb32407b587"
        );
    }

    #[test]
    fn test_account_key_layout() {
        let key = account_key("Vesting", "Vesting", &ALICE);
        assert_eq!(key.len(), 32 + 16 + 32);
        // Pallet and item share a name, so both prefix halves match.
        assert_eq!(key[..16], key[16..32]);
        assert_eq!(&key[32..48], &blake2_128(&ALICE));
        assert_eq!(&key[48..], &ALICE);
    }

    #[test]
    fn test_lock_id_trimming() {
        assert_eq!(lock_id_to_string(b"vesting "), "vesting");
        assert_eq!(lock_id_to_string(b"staking "), "staking");
        assert_eq!(lock_id_to_string(b"pyconvot"), "pyconvot");
        assert_eq!(lock_id_to_string(b"abc\0\0\0\0\0"), "abc");
    }

    #[test]
    fn test_decode_ledger_ignores_trailing_fields() {
        let mut bytes = (
            [7u8; 32],
            Compact(1_000u128),
            Compact(400u128),
            vec![(Compact(500u128), Compact(12u32)), (Compact(100u128), Compact(13u32))],
        )
            .encode();
        // legacy_claimed_rewards
        bytes.extend(vec![1u32, 2, 3].encode());

        let ledger = decode_ledger(&bytes).unwrap();
        assert_eq!(ledger.total, 1_000);
        assert_eq!(ledger.active, 400);
        assert_eq!(
            ledger.unlocking,
            vec![
                UnlockChunk { value: 500, era: 12 },
                UnlockChunk { value: 100, era: 13 },
            ]
        );
    }

    #[test]
    fn test_decode_active_era() {
        let era = decode_active_era(&(42u32, Some(1_700_000_000_000u64)).encode()).unwrap();
        assert_eq!(era.index, 42);
        assert_eq!(era.start, Some(1_700_000_000_000));

        let era = decode_active_era(&(43u32, None::<u64>).encode()).unwrap();
        assert_eq!(era.start, None);
    }

    #[test]
    fn test_decode_failure_is_reported() {
        let err = decode_ledger(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, ChainError::DecodeFailed { what: "staking ledger", .. }));
    }

    #[test]
    fn test_build_snapshot_with_vesting() {
        let account = AccountData {
            free: 10_000,
            reserved: 500,
            frozen: 0,
            flags: 0,
        };
        let locks = vec![
            BalanceLock {
                id: "vesting".into(),
                amount: 6_000,
            },
            BalanceLock {
                id: "staking".into(),
                amount: 2_000,
            },
        ];
        let schedules = vec![
            VestingSchedule {
                locked: 4_000,
                per_block: 10,
                starting_block: 100,
            },
            VestingSchedule {
                locked: 2_000,
                per_block: 0,
                starting_block: 0,
            },
        ];

        let snapshot = build_snapshot(&account, locks, schedules, 200);

        assert_eq!(snapshot.locked_balance, 6_000);
        assert_eq!(snapshot.available_balance, 10_000 - 5_500);
        assert_eq!(snapshot.vesting_total, 6_000);
        // 4_000 - 1_000 vested, plus 2_000 that never vests
        assert_eq!(snapshot.vesting_locked, 5_000);
        assert_eq!(snapshot.vested_balance, 1_000);
        assert_eq!(snapshot.vested_claimable, 1_000);
        assert!(snapshot.available_balance <= snapshot.free_balance);
        assert!(snapshot.vested_claimable <= snapshot.vested_balance);
    }

    #[test]
    fn test_build_snapshot_frozen_dominates() {
        let account = AccountData {
            free: 1_000,
            reserved: 0,
            frozen: 800,
            flags: 0,
        };
        let snapshot = build_snapshot(&account, vec![], vec![], 0);
        assert_eq!(snapshot.locked_balance, 800);
        assert_eq!(snapshot.available_balance, 200);
        assert_eq!(snapshot.vested_claimable, 0);
    }

    #[test]
    fn test_snapshot_waits_for_account() {
        let keys = BalanceKeys::new(&ALICE);
        let mut cache = StorageCache::default();
        assert!(snapshot_from_cache(&cache, &keys).unwrap().is_none());

        cache
            .apply(&change_set(vec![(keys.account.clone(), None)]))
            .unwrap();
        let snapshot = snapshot_from_cache(&cache, &keys).unwrap().unwrap();
        assert_eq!(snapshot.free_balance, 0);
        assert!(snapshot.locked_breakdown.is_empty());
    }

    #[test]
    fn test_snapshot_rebuilt_on_every_change() {
        let keys = BalanceKeys::new(&ALICE);
        let mut cache = StorageCache::default();
        cache
            .apply(&change_set(vec![
                (keys.account.clone(), Some(account_info(5_000, 0, 0))),
                (keys.locks.clone(), Some(locks(&[(b"vesting ", 3_000)]))),
                (
                    keys.vesting.clone(),
                    Some(vec![(3_000u128, 100u128, 10u32)].encode()),
                ),
                (keys.block_number.clone(), Some(20u32.encode())),
            ]))
            .unwrap();

        let first = snapshot_from_cache(&cache, &keys).unwrap().unwrap();
        assert_eq!(first.vesting_locked, 2_000);
        assert_eq!(first.vested_claimable, 1_000);
        assert_eq!(first.available_balance, 2_000);

        // Only the block number changes; the rest comes from the cache.
        cache
            .apply(&change_set(vec![(keys.block_number.clone(), Some(30u32.encode()))]))
            .unwrap();
        let second = snapshot_from_cache(&cache, &keys).unwrap().unwrap();
        assert_eq!(second.vesting_locked, 0);
        assert_eq!(second.vested_claimable, 3_000);
        assert_eq!(second.free_balance, 5_000);
    }

    #[test]
    fn test_ledger_states() {
        let key = ledger_key(&ALICE);
        let mut cache = StorageCache::default();
        assert_eq!(ledger_from_cache(&cache, &key).unwrap(), None);

        cache.apply(&change_set(vec![(key.clone(), None)])).unwrap();
        assert_eq!(ledger_from_cache(&cache, &key).unwrap(), Some(None));
    }

    #[test]
    fn test_progress_requires_era_start() {
        let key = active_era_key();
        let mut cache = StorageCache::default();
        cache
            .apply(&change_set(vec![(key.clone(), Some((5u32, None::<u64>).encode()))]))
            .unwrap();
        assert_eq!(progress_from_cache(&cache, &key, 14_400).unwrap(), None);

        cache
            .apply(&change_set(vec![(key.clone(), Some((5u32, Some(99u64)).encode()))]))
            .unwrap();
        assert_eq!(
            progress_from_cache(&cache, &key, 14_400).unwrap(),
            Some(SessionProgress {
                active_era: 5,
                era_length: 14_400,
                active_era_start: 99,
            })
        );
    }

    #[test]
    fn test_change_set_from_json() {
        let json = serde_json::json!({
            "block": "0xabcd",
            "changes": [["0x01", "0x02"], ["0x03", null]]
        });
        let parsed: StorageChangeSet = serde_json::from_value(json).unwrap();
        let mut cache = StorageCache::default();
        cache.apply(&parsed).unwrap();
        assert_eq!(cache.get(&[1]), Some(&[2u8][..]));
        assert!(cache.has_seen(&[3]));
        assert_eq!(cache.get(&[3]), None);
    }
}
