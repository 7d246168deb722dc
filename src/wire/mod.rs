//! Wire protocol messages
//!
//! This module provides:
//! - Primitive element codec (little-endian integers, compact sizes)
//! - Version-aware network addresses and the `addrv2` address list
//! - The signed mixing session messages
//! - Message dispatch by command string
//!
//! Only message payloads are handled here. Framing (magic, command,
//! checksum header) belongs to the peer transport.

pub mod addrv2;
pub mod codec;
pub mod error;
pub mod message;
pub mod mix;
pub mod netaddress;
pub mod protocol;
pub mod tx;

pub use addrv2::{MsgAddrV2, MAX_ADDR_PER_V2_MSG};
pub use codec::{compact_size_len, Element, WireReader, WireWriter};
pub use error::{ErrorKind, WireError, WireResult};
pub use message::{
    Message, WireMessage, CMD_ADDR_V2, CMD_MIX_CIPHERTEXTS, CMD_MIX_CONFIRM, CMD_MIX_DC_NET,
    CMD_MIX_KEY_EXCHANGE, CMD_MIX_PAIR_REQ, CMD_MIX_SLOT_RESERVE,
};
pub use mix::{
    DcVector, MsgMixCM, MsgMixCT, MsgMixDC, MsgMixKE, MsgMixPR, MsgMixSR, SignedMessage,
};
pub use netaddress::{NetAddressType, NetAddressV2};
pub use protocol::{
    ConfigError, ProtocolVersions, ServiceFlags, ADDR_V2_VERSION, MAX_MESSAGE_PAYLOAD,
    MIX_VERSION, PROTOCOL_VERSION, RELAY_TOR_V3_VERSION,
};
pub use tx::{OutPoint, TxOut};
