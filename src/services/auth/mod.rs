pub mod revocation;
pub mod role;
pub mod token_codec;

pub use role::Role;
pub use token_codec::{SessionToken, TokenCodec, TokenError, TokenKeys};
