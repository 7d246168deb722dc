//! Cryptographic collaborators for the wire layer
//!
//! This module provides:
//! - SHA-256 hashing
//! - The signing and verification contract used by mixing messages
//! - A Schnorr (secp256k1) implementation of that contract

pub mod hash;
pub mod keys;

pub use hash::{sha256_array, sha256_hex};
pub use keys::{KeyError, PayloadSigner, SchnorrSigner, SchnorrVerifier, SignatureVerifier};
