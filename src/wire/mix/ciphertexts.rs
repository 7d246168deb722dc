//! mixct: post-quantum ciphertexts
//!
//! Carries one encapsulated secret for each peer's post-quantum public key,
//! in the order the key exchanges were agreed.

use crate::wire::codec::{WireReader, WireWriter};
use crate::wire::error::WireResult;
use crate::wire::message::{WireMessage, CMD_MIX_CIPHERTEXTS};
use crate::wire::mix::{encode_signed, SignedMessage, SIGNATURE_SIZE};
use crate::wire::protocol::ProtocolVersions;
use std::io::{Read, Write};

/// Size of one post-quantum ciphertext
pub const PQ_CIPHERTEXT_SIZE: usize = 1047;

/// Ciphertexts for the other participants of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgMixCT {
    pub signature: [u8; SIGNATURE_SIZE],
    pub ciphertexts: Vec<[u8; PQ_CIPHERTEXT_SIZE]>,
}

impl MsgMixCT {
    pub fn new(ciphertexts: Vec<[u8; PQ_CIPHERTEXT_SIZE]>) -> Self {
        Self {
            signature: [0u8; SIGNATURE_SIZE],
            ciphertexts,
        }
    }
}

impl WireMessage for MsgMixCT {
    const COMMAND: &'static str = CMD_MIX_CIPHERTEXTS;

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
            ciphertexts: r.read_list("ciphertexts")?,
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

impl SignedMessage for MsgMixCT {
    fn signature(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.signature
    }

    fn set_signature(&mut self, signature: [u8; SIGNATURE_SIZE]) {
        self.signature = signature;
    }

    fn encode_signed_fields<W: Write>(&self, w: &mut WireWriter<'_, W>) -> WireResult<()> {
        w.write_list(&self.ciphertexts, "ciphertexts")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::error::{ErrorKind, WireError};
    use crate::wire::protocol::PROTOCOL_VERSION;

    #[test]
    fn test_round_trip() {
        let versions = ProtocolVersions::default();
        let mut msg = MsgMixCT::new(vec![[0x21; PQ_CIPHERTEXT_SIZE], [0x22; PQ_CIPHERTEXT_SIZE]]);
        msg.signature = [0x01; 64];

        let bytes = msg.to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(bytes.len(), 64 + 1 + 2 * PQ_CIPHERTEXT_SIZE);
        assert_eq!(bytes[64], 2);

        let (decoded, consumed) =

            MsgMixCT::from_bytes(&bytes, PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(consumed, bytes.len());
        assert_eq!(msg.signable_payload().unwrap(), bytes[SIGNATURE_SIZE..].to_vec());
    }

    #[test]
    fn test_empty_list() {
        let versions = ProtocolVersions::default();
        let msg = MsgMixCT::new(Vec::new());
        let bytes = msg.to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(bytes.len(), 65);
        assert_eq!(msg.identity(), None);
    }

    #[test]
    fn test_truncated_ciphertext() {
        let versions = ProtocolVersions::default();
        let msg = MsgMixCT::new(vec![[0x21; PQ_CIPHERTEXT_SIZE]]);
        let bytes = msg.to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        let err = MsgMixCT::from_bytes(&bytes[..bytes.len() - 1], PROTOCOL_VERSION, &versions)
            .unwrap_err();
        assert!(matches!(err, WireError::TruncatedInput { field: "ciphertexts", .. }));
    }

    #[test]
    fn test_version_gating() {
        let versions = ProtocolVersions::default();
        let msg = MsgMixCT::new(Vec::new());
        let err = msg.to_bytes(versions.mix - 1, &versions).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionTooLow);
        assert_eq!(msg.max_payload_length(PROTOCOL_VERSION, &versions), 0);
    }
}
