//! Content hashing for statement deduplication and cache namespacing.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a lowercase hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Derives a short deterministic namespace token from the input.
///
/// The token is the first twelve hex characters of the SHA-256 digest, enough
/// to keep unrelated deployments apart on a shared cache backend.
pub fn namespace_token(input: &str) -> String {
    sha256_hex(input)[..12].to_string()
}
