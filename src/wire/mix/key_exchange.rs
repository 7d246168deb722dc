//! mixke: key exchange
//!
//! Delivers a participant's Diffie-Hellman and post-quantum public keys for
//! one run, a commitment to the secrets it may later reveal, and the pair
//! requests it has seen so that peers agree on membership before any
//! secret is exchanged.

use crate::wire::codec::{WireReader, WireWriter};
use crate::wire::error::WireResult;
use crate::wire::message::{WireMessage, CMD_MIX_KEY_EXCHANGE};
use crate::wire::mix::{encode_signed, SignedMessage, IDENTITY_SIZE, SIGNATURE_SIZE};
use crate::wire::protocol::ProtocolVersions;
use std::io::{Read, Write};

/// Size of the post-quantum public key
pub const PQ_PUBLIC_KEY_SIZE: usize = 1218;

/// Key exchange for one mixing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgMixKE {
    pub signature: [u8; SIGNATURE_SIZE],
    pub identity: [u8; IDENTITY_SIZE],
    /// X25519 public key
    pub ecdh: [u8; 32],
    /// Hash of the secrets revealed on blame
    pub commitment: [u8; 32],
    pub run: u32,
    /// Hashes of the pair requests this participant has observed
    pub seen_prs: Vec<[u8; 32]>,
    pub pqpk: Box<[u8; PQ_PUBLIC_KEY_SIZE]>,
}

impl MsgMixKE {
    /// Create an unsigned key exchange
    pub fn new(
        identity: [u8; IDENTITY_SIZE],
        run: u32,
        seen_prs: Vec<[u8; 32]>,
        ecdh: [u8; 32],
        pqpk: Box<[u8; PQ_PUBLIC_KEY_SIZE]>,
        commitment: [u8; 32],
    ) -> Self {
        Self {
            signature: [0u8; SIGNATURE_SIZE],
            identity,
            ecdh,
            commitment,
            run,
            seen_prs,
            pqpk,
        }
    }
}

impl WireMessage for MsgMixKE {
    const COMMAND: &'static str = CMD_MIX_KEY_EXCHANGE;

    fn min_version(versions: &ProtocolVersions) -> u32 {
        versions.mix
    }

    fn max_payload_length(&self, _pver: u32, _versions: &ProtocolVersions) -> u32 {
        0
    }

    fn decode_payload<R: Read>(
        r: &mut WireReader<'_, R>,
        _pver: u32,
        _versions: &ProtocolVersions,
    ) -> WireResult<Self> {
        Ok(Self {
            signature: r.read("signature")?,
            identity: r.read("identity")?,
            ecdh: r.read("ecdh")?,
            commitment: r.read("commitment")?,
            run: r.read("run")?,
            seen_prs: r.read_list("seen prs")?,
            pqpk: r.read("pqpk")?,
        })
    }

    fn encode_payload<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        _pver: u32,
        _versions: &ProtocolVersions,
    ) -> WireResult<()> {
        encode_signed(self, w)
    }
}

impl SignedMessage for MsgMixKE {
    fn signature(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.signature
    }

    fn set_signature(&mut self, signature: [u8; SIGNATURE_SIZE]) {
        self.signature = signature;
    }

    fn identity(&self) -> Option<&[u8; IDENTITY_SIZE]> {
        Some(&self.identity)
    }

    fn encode_signed_fields<W: Write>(&self, w: &mut WireWriter<'_, W>) -> WireResult<()> {
        w.write(&self.identity, "identity")?;
        w.write(&self.ecdh, "ecdh")?;
        w.write(&self.commitment, "commitment")?;
        w.write(&self.run, "run")?;
        w.write_list(&self.seen_prs, "seen prs")?;
        w.write(&self.pqpk, "pqpk")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::error::{ErrorKind, WireError};
    use crate::wire::protocol::PROTOCOL_VERSION;

    fn sample() -> MsgMixKE {
        let mut msg = MsgMixKE::new(
            [0x01; 32],
            7,
            vec![[0x0a; 32], [0x0b; 32], [0x0c; 32]],
            [0x02; 32],
            Box::new([0x03; PQ_PUBLIC_KEY_SIZE]),
            [0x04; 32],
        );
        msg.signature = [0xee; 64];
        msg
    }

    #[test]
    fn test_round_trip() {
        let versions = ProtocolVersions::default();
        let msg = sample();
        let bytes = msg.to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(bytes.len(), 64 + 32 + 32 + 32 + 4 + 1 + 3 * 32 + PQ_PUBLIC_KEY_SIZE);

        let (decoded, consumed) =

            MsgMixKE::from_bytes(&bytes, PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_field_order() {
        let versions = ProtocolVersions::default();
        let bytes = sample().to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(&bytes[64..96], &[0x01; 32]);
        assert_eq!(&bytes[96..128], &[0x02; 32]);
        assert_eq!(&bytes[128..160], &[0x04; 32]);
        assert_eq!(&bytes[160..164], &[7, 0, 0, 0]);
        assert_eq!(bytes[164], 3);
    }

    #[test]
    fn test_signable_payload_skips_signature() {
        let versions = ProtocolVersions::default();
        let msg = sample();
        let bytes = msg.to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(msg.signable_payload().unwrap(), bytes[SIGNATURE_SIZE..].to_vec());
    }

    #[test]
    fn test_truncated_pq_key() {
        let versions = ProtocolVersions::default();
        let bytes = sample().to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        let err = MsgMixKE::from_bytes(&bytes[..bytes.len() - 100], PROTOCOL_VERSION, &versions)
            .unwrap_err();
        assert!(matches!(err, WireError::TruncatedInput { field: "pqpk", .. }));
    }

    #[test]
    fn test_version_gating() {
        let versions = ProtocolVersions::default();
        let err = sample().to_bytes(versions.mix - 1, &versions).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionTooLow);
    }
}
