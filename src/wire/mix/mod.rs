//! Mixing session messages
//!
//! Six messages make up one run of a multi-party mixing session:
//! - `mixpr`: pair request committing unspent outputs to the mix
//! - `mixke`: key exchange, fixing session membership
//! - `mixct`: post-quantum ciphertexts for other participants
//! - `mixsr`: slot reservation contributions
//! - `mixdc`: DC-net contributions
//! - `mixcm`: confirmation of the mixed result
//!
//! Every message starts with a 64-byte signature over the rest of its
//! fields in encode order. Producing and checking signatures is left to a
//! [`PayloadSigner`] / [`SignatureVerifier`]; this module only defines
//! which bytes are covered.

pub mod ciphertexts;
pub mod confirm;
pub mod dc_net;
pub mod key_exchange;
pub mod pair_request;
pub mod slot_reserve;

pub use ciphertexts::{MsgMixCT, PQ_CIPHERTEXT_SIZE};
pub use confirm::MsgMixCM;
pub use dc_net::{DcVector, MsgMixDC};
pub use key_exchange::{MsgMixKE, PQ_PUBLIC_KEY_SIZE};
pub use pair_request::MsgMixPR;
pub use slot_reserve::MsgMixSR;

use crate::crypto::{PayloadSigner, SignatureVerifier};
use crate::wire::codec::WireWriter;
use crate::wire::error::WireResult;
use crate::wire::message::WireMessage;
use std::io::Write;

/// Size of a mixing message signature
pub const SIGNATURE_SIZE: usize = 64;

/// Size of a mixing session identity key
pub const IDENTITY_SIZE: usize = 32;

/// A mixing message authenticated by a leading signature
pub trait SignedMessage: WireMessage {
    fn signature(&self) -> &[u8; SIGNATURE_SIZE];

    fn set_signature(&mut self, signature: [u8; SIGNATURE_SIZE]);

    /// Identity key carried in the message, if it has one
    fn identity(&self) -> Option<&[u8; IDENTITY_SIZE]> {
        None
    }

    /// Write every field after the signature, in encode order
    fn encode_signed_fields<W: Write>(&self, w: &mut WireWriter<'_, W>) -> WireResult<()>;

    /// Bytes covered by the signature
    fn signable_payload(&self) -> WireResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode_signed_fields(&mut WireWriter::new(&mut buf, Self::COMMAND))?;
        Ok(buf)
    }

    /// Sign the payload and store the signature
    fn sign<S: PayloadSigner>(&mut self, signer: &S) -> WireResult<()> {
        let payload = self.signable_payload()?;
        self.set_signature(signer.sign(&payload));
        Ok(())
    }

    /// Check the signature against `identity`
    fn verify<V: SignatureVerifier>(&self, verifier: &V, identity: &[u8; IDENTITY_SIZE]) -> bool {
        match self.signable_payload() {
            Ok(payload) => verifier.verify(identity, &payload, self.signature()),
            Err(e) => {
                log::debug!("Cannot build {} signable payload: {}", Self::COMMAND, e);
                false
            }
        }
    }

    /// Check the signature against the identity the message claims
    ///
    /// Always false for messages without an identity field.
    fn verify_claimed<V: SignatureVerifier>(&self, verifier: &V) -> bool {
        match self.identity() {
            Some(identity) => self.verify(verifier, identity),
            None => false,
        }
    }
}

/// Write the signature followed by the signed fields
pub(crate) fn encode_signed<M: SignedMessage, W: Write>(
    msg: &M,
    w: &mut WireWriter<'_, W>,
) -> WireResult<()> {
    w.write(msg.signature(), "signature")?;
    msg.encode_signed_fields(w)
}
