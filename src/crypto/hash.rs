//! SHA-256 hashing utilities

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash as a fixed-size array
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_array(data))
}
