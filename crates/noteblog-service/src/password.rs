//! Password digests.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hex-encoded SHA-256 digest of a password.
pub fn digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Checks `password` against a stored digest in constant time.
pub fn verify(password: &str, stored_digest: &str) -> bool {
    let computed = digest(password);
    computed.len() == stored_digest.len()
        && bool::from(computed.as_bytes().ct_eq(stored_digest.as_bytes()))
}
