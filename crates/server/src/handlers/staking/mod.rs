mod get_staking;

pub use get_staking::{ChunkView, StakingResponse, StakingShares, get_staking};
