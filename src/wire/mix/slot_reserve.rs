//! mixsr: slot reservation

use crate::wire::codec::{WireReader, WireWriter};
use crate::wire::error::WireResult;
use crate::wire::message::{WireMessage, CMD_MIX_SLOT_RESERVE};
use crate::wire::mix::{encode_signed, SignedMessage, SIGNATURE_SIZE};
use crate::wire::protocol::ProtocolVersions;
use std::io::{Read, Write};

/// Contributions to the shared slot reservation for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgMixSR {
    pub signature: [u8; SIGNATURE_SIZE],
    pub run: u32,
    /// One opaque contribution per participant
    pub dc_mix: Vec<Vec<u8>>,
}

impl MsgMixSR {
    pub fn new(run: u32, dc_mix: Vec<Vec<u8>>) -> Self {
        Self {
            signature: [0u8; SIGNATURE_SIZE],
            run,
            dc_mix,
        }
    }
}

impl WireMessage for MsgMixSR {
    const COMMAND: &'static str = CMD_MIX_SLOT_RESERVE;

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
            run: r.read("run")?,
            dc_mix: r.read_list("dc mix")?,
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

impl SignedMessage for MsgMixSR {
    fn signature(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.signature
    }

    fn set_signature(&mut self, signature: [u8; SIGNATURE_SIZE]) {
        self.signature = signature;
    }

    fn encode_signed_fields<W: Write>(&self, w: &mut WireWriter<'_, W>) -> WireResult<()> {
        w.write(&self.run, "run")?;
        w.write_list(&self.dc_mix, "dc mix")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::error::ErrorKind;
    use crate::wire::protocol::PROTOCOL_VERSION;

    #[test]
    fn test_layout() {
        let versions = ProtocolVersions::default();
        let mut msg = MsgMixSR::new(9, vec![vec![0xaa, 0xbb], vec![], vec![0xcc]]);
        msg.signature = [0x33; 64];
        let bytes = msg.to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(
            hex::encode(&bytes[64..]),
            "0900000003".to_string() + "02aabb" + "00" + "01cc"
        );

        let (decoded, consumed) =

            MsgMixSR::from_bytes(&bytes, PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_signable_payload_skips_signature() {
        let mut msg = MsgMixSR::new(1, vec![vec![1, 2, 3]]);
        let before = msg.signable_payload().unwrap();
        msg.signature = [0xff; 64];
        assert_eq!(msg.signable_payload().unwrap(), before);
        assert_eq!(&before[..4], &[1, 0, 0, 0]);
    }

    #[test]
    fn test_truncated_blob() {
        let versions = ProtocolVersions::default();
        let bytes = MsgMixSR::new(1, vec![vec![7; 10]])
            .to_bytes(PROTOCOL_VERSION, &versions)
            .unwrap();
        let err = MsgMixSR::from_bytes(&bytes[..bytes.len() - 3], PROTOCOL_VERSION, &versions)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn test_version_gating() {
        let versions = ProtocolVersions::default();
        let err = MsgMixSR::new(1, Vec::new())
            .to_bytes(versions.mix - 1, &versions)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionTooLow);
    }
}
