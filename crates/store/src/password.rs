//! bcrypt password hashes and opaque session tokens.

use crate::{Result, StoreError};
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

pub const DEFAULT_PASSWORD_COST: u32 = bcrypt::DEFAULT_COST;
/// Lowest work factor bcrypt accepts. Only suitable for tests.
pub const MIN_PASSWORD_COST: u32 = 4;

pub fn random_hex(len: usize) -> Result<String> {
    let mut buf = vec![0u8; len];
    getrandom::getrandom(&mut buf)
        .map_err(|err| StoreError::Other(format!("system randomness unavailable: {err}")))?;
    Ok(to_hex(&buf))
}

pub fn new_session_token() -> Result<String> {
    random_hex(TOKEN_BYTES)
}

/// Salted bcrypt hash; the salt and cost travel inside the returned string.
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost)
        .map_err(|err| StoreError::Other(format!("password hashing failed: {err}")))
}

#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(err) => {
            log::warn!("Stored password hash is unreadable: {err}");
            false
        }
    }
}

/// Sessions are stored by digest so a leaked snapshot does not leak live tokens.
#[must_use]
pub fn token_digest(token: &str) -> String {
    to_hex(&Sha256::digest(token.as_bytes()))
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
