mod claim_vested;
mod get_vesting;

pub use claim_vested::claim_vested;
pub use get_vesting::{VestingRaw, VestingResponse, VestingShares, get_vesting};
