//! mixcm: confirm mix

use crate::wire::codec::{WireReader, WireWriter};
use crate::wire::error::WireResult;
use crate::wire::message::{WireMessage, CMD_MIX_CONFIRM};
use crate::wire::mix::{encode_signed, SignedMessage, SIGNATURE_SIZE};
use crate::wire::protocol::ProtocolVersions;
use std::io::{Read, Write};

/// Confirmation of the jointly built mix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgMixCM {
    pub signature: [u8; SIGNATURE_SIZE],
    pub reveal_secrets: bool,
    /// Serialized mix result, usually the signed transaction
    pub mix: Vec<u8>,
}

impl MsgMixCM {
    pub fn new(mix: Vec<u8>, reveal_secrets: bool) -> Self {
        Self {
            signature: [0u8; SIGNATURE_SIZE],
            reveal_secrets,
            mix,
        }
    }
}

impl WireMessage for MsgMixCM {
    const COMMAND: &'static str = CMD_MIX_CONFIRM;

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
            reveal_secrets: r.read("reveal secrets")?,
            mix: r.read("mix")?,
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

impl SignedMessage for MsgMixCM {
    fn signature(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.signature
    }

    fn set_signature(&mut self, signature: [u8; SIGNATURE_SIZE]) {
        self.signature = signature;
    }

    fn encode_signed_fields<W: Write>(&self, w: &mut WireWriter<'_, W>) -> WireResult<()> {
        w.write(&self.reveal_secrets, "reveal secrets")?;
        w.write(&self.mix, "mix")
    }
}
