//! mixwire: payload codec for addrv2 and coin-mixing peer messages
//!
//! This crate provides:
//! - A little-endian element codec with compact-size lengths
//! - Version-aware network address records and the `addrv2` list
//! - The signed mixing session messages and their signable payloads
//! - Schnorr signing and verification for mixing identities
//! - Peer address classification and network group keys
//!
//! # Example
//!
//! ```rust
//! use mixwire::addrmgr::group_key;
//! use mixwire::wire::{
//!     MsgAddrV2, NetAddressV2, ProtocolVersions, ServiceFlags, WireMessage, PROTOCOL_VERSION,
//! };
//!
//! let versions = ProtocolVersions::default();
//!
//! // Build and encode an address list
//! let mut msg = MsgAddrV2::new();
//! let ip = "8.8.8.8".parse().unwrap();
//! msg.add(NetAddressV2::from_ip(ip, 9108, ServiceFlags::NODE_NETWORK)).unwrap();
//! let bytes = msg.to_bytes(PROTOCOL_VERSION, &versions).unwrap();
//!
//! // Decode it again
//! let (decoded, consumed) = MsgAddrV2::from_bytes(&bytes, PROTOCOL_VERSION, &versions).unwrap();
//! assert_eq!(decoded, msg);
//! assert_eq!(consumed, bytes.len());
//!
//! // Group the peer for connection diversity
//! assert_eq!(group_key(&ip), "8.8.0.0");
//! ```

pub mod addrmgr;
pub mod cli;
pub mod crypto;
pub mod wire;

// Re-export commonly used types
pub use addrmgr::{classify, group_key, is_routable, AddressCategory, AddressInfo};
pub use crypto::{PayloadSigner, SchnorrSigner, SchnorrVerifier, SignatureVerifier};
pub use wire::{
    Message, MsgAddrV2, NetAddressType, NetAddressV2, ProtocolVersions, ServiceFlags,
    SignedMessage, WireError, WireMessage, PROTOCOL_VERSION,
};
