//! Message signing for mixing sessions
//!
//! The wire layer only decides which bytes a signature covers. Producing
//! and checking signatures goes through [`PayloadSigner`] and
//! [`SignatureVerifier`], so the scheme can be swapped without touching
//! the codec. [`SchnorrSigner`] / [`SchnorrVerifier`] sign the SHA-256 of
//! the payload with BIP-340 Schnorr over secp256k1, using x-only public
//! keys as the 32-byte session identity.

use rand::rngs::OsRng;
use secp256k1::{schnorr, All, Keypair, Message, Secp256k1, SecretKey, XOnlyPublicKey};
use thiserror::Error;

use super::hash::sha256_array;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// Checks a 64-byte signature over a payload
pub trait SignatureVerifier {
    fn verify(&self, identity: &[u8; 32], payload: &[u8], signature: &[u8; 64]) -> bool;
}

/// Produces 64-byte signatures under a 32-byte identity
pub trait PayloadSigner {
    /// Identity key peers verify against
    fn identity(&self) -> [u8; 32];

    fn sign(&self, payload: &[u8]) -> [u8; 64];
}

/// Schnorr signer holding a session identity key
pub struct SchnorrSigner {
    secp: Secp256k1<All>,
    keypair: Keypair,
}

impl SchnorrSigner {
    /// Generate a new random identity
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let keypair = Keypair::new(&secp, &mut OsRng);
        Self { secp, keypair }
    }

    /// Create a signer from an existing secret key
    pub fn from_secret_key(secret_key: &SecretKey) -> Self {
        let secp = Secp256k1::new();
        let keypair = Keypair::from_secret_key(&secp, secret_key);
        Self { secp, keypair }
    }

    /// Create a signer from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key = SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(&secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.keypair.secret_bytes())
    }

    /// Get the identity as a hex string
    pub fn identity_hex(&self) -> String {
        hex::encode(self.identity())
    }
}

impl PayloadSigner for SchnorrSigner {
    fn identity(&self) -> [u8; 32] {
        self.keypair.x_only_public_key().0.serialize()
    }

    fn sign(&self, payload: &[u8]) -> [u8; 64] {
        let message = Message::from_digest(sha256_array(payload));
        let signature = self.secp.sign_schnorr(&message, &self.keypair);
        let mut out = [0u8; 64];
        out.copy_from_slice(&signature[..]);
        out
    }
}

/// Schnorr verifier for session identities
pub struct SchnorrVerifier {
    secp: Secp256k1<All>,
}

impl SchnorrVerifier {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Verify, reporting why a check could not be performed
    pub fn try_verify(
        &self,
        identity: &[u8; 32],
        payload: &[u8],
        signature: &[u8; 64],
    ) -> Result<bool, KeyError> {
        let public_key =
            XOnlyPublicKey::from_slice(identity).map_err(|_| KeyError::InvalidPublicKey)?;
        let signature = schnorr::Signature::from_slice(signature)?;
        let message = Message::from_digest(sha256_array(payload));

        match self.secp.verify_schnorr(&signature, &message, &public_key) {
            Ok(()) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}

impl Default for SchnorrVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureVerifier for SchnorrVerifier {
    fn verify(&self, identity: &[u8; 32], payload: &[u8], signature: &[u8; 64]) -> bool {
        match self.try_verify(identity, payload, signature) {
            Ok(valid) => valid,
            Err(e) => {
                log::debug!("Rejecting signature: {}", e);
                false
            }
        }
    }
}
