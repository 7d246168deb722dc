//! mixdc: DC-net contributions
//!
//! Each participant broadcasts one masked vector per mixed message. The
//! masks cancel out once every contribution for the run is combined.

use crate::wire::codec::{Element, WireReader, WireWriter};
use crate::wire::error::WireResult;
use crate::wire::message::{WireMessage, CMD_MIX_DC_NET};
use crate::wire::mix::{encode_signed, SignedMessage, SIGNATURE_SIZE};
use crate::wire::protocol::ProtocolVersions;
use std::io::{Read, Write};

/// One masked DC-net vector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DcVector {
    /// Number of messages in the vector
    pub n: u32,
    /// Size of each message in bytes
    pub msize: u32,
    pub data: Vec<u8>,
}

impl DcVector {
    pub fn new(n: u32, msize: u32, data: Vec<u8>) -> Self {
        Self { n, msize, data }
    }
}

impl Element for DcVector {
    fn decode_element<R: Read>(r: &mut WireReader<'_, R>, field: &'static str) -> WireResult<Self> {
        Ok(Self {
            n: r.read(field)?,
            msize: r.read(field)?,
            data: r.read(field)?,
        })
    }

    fn encode_element<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        field: &'static str,
    ) -> WireResult<()> {
        w.write(&self.n, field)?;
        w.write(&self.msize, field)?;
        w.write(&self.data, field)
    }
}

/// DC-net broadcast for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgMixDC {
    pub signature: [u8; SIGNATURE_SIZE],
    pub run: u32,
    pub dc_net: Vec<DcVector>,
    /// Set when the run is being blamed and secrets are disclosed
    pub reveal_secrets: bool,
}

impl MsgMixDC {
    pub fn new(run: u32, dc_net: Vec<DcVector>, reveal_secrets: bool) -> Self {
        Self {
            signature: [0u8; SIGNATURE_SIZE],
            run,
            dc_net,
            reveal_secrets,
        }
    }
}

impl WireMessage for MsgMixDC {
    const COMMAND: &'static str = CMD_MIX_DC_NET;

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
            dc_net: r.read_list("dc net")?,
            reveal_secrets: r.read("reveal secrets")?,
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

impl SignedMessage for MsgMixDC {
    fn signature(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.signature
    }

    fn set_signature(&mut self, signature: [u8; SIGNATURE_SIZE]) {
        self.signature = signature;
    }

    fn encode_signed_fields<W: Write>(&self, w: &mut WireWriter<'_, W>) -> WireResult<()> {
        w.write(&self.run, "run")?;
        w.write_list(&self.dc_net, "dc net")?;
        w.write(&self.reveal_secrets, "reveal secrets")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::error::{ErrorKind, WireError};
    use crate::wire::protocol::PROTOCOL_VERSION;

    fn sample() -> MsgMixDC {
        let mut msg = MsgMixDC::new(
            4,
            vec![
                DcVector::new(2, 3, vec![1, 2, 3, 4, 5, 6]),
                DcVector::new(1, 2, vec![0xfe, 0xff]),
            ],
            true,
        );
        msg.signature = [0x44; 64];
        msg
    }

    #[test]
    fn test_layout() {
        let versions = ProtocolVersions::default();
        let bytes = sample().to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        let expected = [
            "04000000",
            "02",
            "02000000",
            "03000000",
            "06010203040506",
            "01000000",
            "02000000",
            "02feff",
            "01",
        ]
        .concat();
        assert_eq!(hex::encode(&bytes[64..]), expected);
    }

    #[test]
    fn test_round_trip() {
        let versions = ProtocolVersions::default();
        let msg = sample();
        let bytes = msg.to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        let (decoded, consumed) =
            MsgMixDC::from_bytes(&bytes, PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(consumed, bytes.len());
        assert_eq!(msg.signable_payload().unwrap(), bytes[SIGNATURE_SIZE..].to_vec());
    }

    #[test]
    fn test_nonzero_flag_is_true() {
        let versions = ProtocolVersions::default();
        let mut bytes = MsgMixDC::new(1, Vec::new(), false)
            .to_bytes(PROTOCOL_VERSION, &versions)
            .unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 0x02;
        let (decoded, _) = MsgMixDC::from_bytes(&bytes, PROTOCOL_VERSION, &versions).unwrap();
        assert!(decoded.reveal_secrets);
    }

    #[test]
    fn test_missing_flag() {
        let versions = ProtocolVersions::default();
        let bytes = sample().to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        let err = MsgMixDC::from_bytes(&bytes[..bytes.len() - 1], PROTOCOL_VERSION, &versions)
            .unwrap_err();
        assert!(matches!(err, WireError::TruncatedInput { field: "reveal secrets", .. }));
    }

    #[test]
    fn test_version_gating() {
        let versions = ProtocolVersions::default();
        let bytes = sample().to_bytes(versions.mix, &versions).unwrap();
        let err = MsgMixDC::from_bytes(&bytes, versions.mix - 1, &versions).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionTooLow);
    }
}
