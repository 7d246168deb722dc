//! Message envelope contract and dispatch
//!
//! Every message type implements [`WireMessage`]. The provided `encode` and
//! `decode` methods check the negotiated protocol version before touching
//! the writer or reader, then defer to the type's payload codec.
//! [`Message`] is the closed set of all message types handled here.

use crate::wire::addrv2::MsgAddrV2;
use crate::wire::codec::{WireReader, WireWriter};
use crate::wire::error::{WireError, WireResult};
use crate::wire::mix::{MsgMixCM, MsgMixCT, MsgMixDC, MsgMixKE, MsgMixPR, MsgMixSR};
use crate::wire::protocol::ProtocolVersions;
use std::io::{Read, Write};

// =============================================================================
// Commands
// =============================================================================

pub const CMD_ADDR_V2: &str = "addrv2";
pub const CMD_MIX_PAIR_REQ: &str = "mixpr";
pub const CMD_MIX_KEY_EXCHANGE: &str = "mixke";
pub const CMD_MIX_CIPHERTEXTS: &str = "mixct";
pub const CMD_MIX_SLOT_RESERVE: &str = "mixsr";
pub const CMD_MIX_DC_NET: &str = "mixdc";
pub const CMD_MIX_CONFIRM: &str = "mixcm";

// =============================================================================
// Message Contract
// =============================================================================

/// Operations shared by every wire message
pub trait WireMessage: Sized {
    /// Protocol command string
    const COMMAND: &'static str;

    /// Minimum protocol version at which the message exists
    fn min_version(versions: &ProtocolVersions) -> u32;

    /// Maximum payload length at `pver`; 0 when no bound is published
    fn max_payload_length(&self, pver: u32, versions: &ProtocolVersions) -> u32;

    /// Read the payload, after the version check has passed
    fn decode_payload<R: Read>(
        r: &mut WireReader<'_, R>,
        pver: u32,
        versions: &ProtocolVersions,
    ) -> WireResult<Self>;

    /// Write the payload, after the version check has passed
    fn encode_payload<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        pver: u32,
        versions: &ProtocolVersions,
    ) -> WireResult<()>;

    fn command(&self) -> &'static str {
        Self::COMMAND
    }

    /// Fail unless `pver` is at least the message's minimum version
    fn check_version(pver: u32, versions: &ProtocolVersions) -> WireResult<()> {
        let required = Self::min_version(versions);
        if pver < required {
            return Err(WireError::VersionTooLow {
                command: Self::COMMAND,
                pver,
                required,
            });
        }
        Ok(())
    }

    /// Decode a message from `r`
    fn decode<R: Read>(r: &mut R, pver: u32, versions: &ProtocolVersions) -> WireResult<Self> {
        Self::check_version(pver, versions)?;
        Self::decode_payload(&mut WireReader::new(r, Self::COMMAND), pver, versions)
    }

    /// Encode this message to `w`
    fn encode<W: Write>(
        &self,
        w: &mut W,
        pver: u32,
        versions: &ProtocolVersions,
    ) -> WireResult<()> {
        Self::check_version(pver, versions)?;
        self.encode_payload(&mut WireWriter::new(w, Self::COMMAND), pver, versions)
    }

    /// Encode this message into a new buffer
    fn to_bytes(&self, pver: u32, versions: &ProtocolVersions) -> WireResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(&mut buf, pver, versions)?;
        Ok(buf)
    }

    /// Decode a message from the front of `bytes`, returning the bytes consumed
    fn from_bytes(
        bytes: &[u8],
        pver: u32,
        versions: &ProtocolVersions,
    ) -> WireResult<(Self, usize)> {
        let mut cursor = bytes;
        let msg = Self::decode(&mut cursor, pver, versions)?;
        Ok((msg, bytes.len() - cursor.len()))
    }
}

// =============================================================================
// Message Set
// =============================================================================

/// All message types handled by this crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Peer address list
    AddrV2(MsgAddrV2),
    /// Mixing pair request
    MixPairReq(MsgMixPR),
    /// Mixing key exchange
    MixKeyExchange(MsgMixKE),
    /// Mixing post-quantum ciphertexts
    MixCiphertexts(MsgMixCT),
    /// Mixing slot reservation
    MixSlotReserve(MsgMixSR),
    /// Mixing DC-net contribution
    MixDcNet(MsgMixDC),
    /// Mixing confirmation
    MixConfirm(MsgMixCM),
}

impl Message {
    /// Protocol command string
    pub fn command(&self) -> &'static str {
        match self {
            Message::AddrV2(msg) => msg.command(),
            Message::MixPairReq(msg) => msg.command(),
            Message::MixKeyExchange(msg) => msg.command(),
            Message::MixCiphertexts(msg) => msg.command(),
            Message::MixSlotReserve(msg) => msg.command(),
            Message::MixDcNet(msg) => msg.command(),
            Message::MixConfirm(msg) => msg.command(),
        }
    }

    /// Maximum payload length at `pver`
    pub fn max_payload_length(&self, pver: u32, versions: &ProtocolVersions) -> u32 {
        match self {
            Message::AddrV2(msg) => msg.max_payload_length(pver, versions),
            Message::MixPairReq(msg) => msg.max_payload_length(pver, versions),
            Message::MixKeyExchange(msg) => msg.max_payload_length(pver, versions),
            Message::MixCiphertexts(msg) => msg.max_payload_length(pver, versions),
            Message::MixSlotReserve(msg) => msg.max_payload_length(pver, versions),
            Message::MixDcNet(msg) => msg.max_payload_length(pver, versions),
            Message::MixConfirm(msg) => msg.max_payload_length(pver, versions),
        }
    }

    /// Encode the payload of this message to `w`
    pub fn encode<W: Write>(
        &self,
        w: &mut W,
        pver: u32,
        versions: &ProtocolVersions,
    ) -> WireResult<()> {
        match self {
            Message::AddrV2(msg) => msg.encode(w, pver, versions),
            Message::MixPairReq(msg) => msg.encode(w, pver, versions),
            Message::MixKeyExchange(msg) => msg.encode(w, pver, versions),
            Message::MixCiphertexts(msg) => msg.encode(w, pver, versions),
            Message::MixSlotReserve(msg) => msg.encode(w, pver, versions),
            Message::MixDcNet(msg) => msg.encode(w, pver, versions),
            Message::MixConfirm(msg) => msg.encode(w, pver, versions),
        }
    }

    /// Decode the payload of a `command` message from `r`
    pub fn decode<R: Read>(
        command: &str,
        r: &mut R,
        pver: u32,
        versions: &ProtocolVersions,
    ) -> WireResult<Self> {
        log::trace!("Decoding {} payload at protocol version {}", command, pver);

        let msg = match command {
            CMD_ADDR_V2 => Message::AddrV2(MsgAddrV2::decode(r, pver, versions)?),
            CMD_MIX_PAIR_REQ => Message::MixPairReq(MsgMixPR::decode(r, pver, versions)?),
            CMD_MIX_KEY_EXCHANGE => Message::MixKeyExchange(MsgMixKE::decode(r, pver, versions)?),
            CMD_MIX_CIPHERTEXTS => Message::MixCiphertexts(MsgMixCT::decode(r, pver, versions)?),
            CMD_MIX_SLOT_RESERVE => Message::MixSlotReserve(MsgMixSR::decode(r, pver, versions)?),
            CMD_MIX_DC_NET => Message::MixDcNet(MsgMixDC::decode(r, pver, versions)?),
            CMD_MIX_CONFIRM => Message::MixConfirm(MsgMixCM::decode(r, pver, versions)?),
            other => {
                log::debug!("Rejecting unknown command {:?}", other);
                return Err(WireError::UnknownCommand(other.to_string()));
            }
        };
        Ok(msg)
    }

    /// Encode into a new buffer
    pub fn to_bytes(&self, pver: u32, versions: &ProtocolVersions) -> WireResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(&mut buf, pver, versions)?;
        Ok(buf)
    }

    /// Decode from the front of `bytes`, returning the bytes consumed
    pub fn from_bytes(
        command: &str,
        bytes: &[u8],
        pver: u32,
        versions: &ProtocolVersions,
    ) -> WireResult<(Self, usize)> {
        let mut cursor = bytes;
        let msg = Self::decode(command, &mut cursor, pver, versions)?;
        Ok((msg, bytes.len() - cursor.len()))
    }

    /// Get message type name for logging
    pub fn type_name(&self) -> &'static str {
        match self {
            Message::AddrV2(_) => "AddrV2",
            Message::MixPairReq(_) => "MixPairReq",
            Message::MixKeyExchange(_) => "MixKeyExchange",
            Message::MixCiphertexts(_) => "MixCiphertexts",
            Message::MixSlotReserve(_) => "MixSlotReserve",
            Message::MixDcNet(_) => "MixDcNet",
            Message::MixConfirm(_) => "MixConfirm",
        }
    }
}

macro_rules! impl_from_message {
    ($($variant:ident($ty:ty)),*) => {$(
        impl From<$ty> for Message {
            fn from(msg: $ty) -> Self {
                Message::$variant(msg)
            }
        }
    )*};
}

impl_from_message!(
    AddrV2(MsgAddrV2),
    MixPairReq(MsgMixPR),
    MixKeyExchange(MsgMixKE),
    MixCiphertexts(MsgMixCT),
    MixSlotReserve(MsgMixSR),
    MixDcNet(MsgMixDC),
    MixConfirm(MsgMixCM)
);
