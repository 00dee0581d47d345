pub mod account;
pub mod health;
pub mod staking;
pub mod token;
pub mod types;
pub mod vesting;
pub mod wallet;
