mod get_account;

pub use get_account::{AccountResponse, LockView, get_account};
