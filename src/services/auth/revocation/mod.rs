pub mod memory;
pub mod store;
pub mod valkey;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

use crate::services::auth::token_codec::TokenCodec;

pub use memory::InMemoryRevocationStore;
pub use store::{RevocationError, RevocationStore};
pub use valkey::ValkeyRevocationStore;

/// Revocation key for a raw credential.
///
/// - `jti` when the credential looks like a token carrying one
/// - otherwise `raw:<base64url(sha256(raw))>` so raw credentials are never stored verbatim
pub fn revocation_key(raw: &str) -> String {
    match TokenCodec::peek_token_id(raw) {
        Some(jti) => jti,
        None => raw_fingerprint(raw),
    }
}

pub fn raw_fingerprint(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    format!("raw:{}", URL_SAFE_NO_PAD.encode(digest))
}
