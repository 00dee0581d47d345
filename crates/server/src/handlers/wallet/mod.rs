mod get_accounts;
mod select_account;

pub use get_accounts::{WalletAccountsResponse, get_accounts};
pub use select_account::{SelectAccountRequest, select_account};
