mod get_token;

pub use get_token::get_token;
