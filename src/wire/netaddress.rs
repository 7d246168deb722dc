//! Version 2 network address records
//!
//! A record is the address of one peer as announced in an addrv2 message.
//! The width of the address field depends on the address type, and Tor v3
//! records are only valid once the Tor v3 relay version is negotiated.

use crate::wire::codec::{WireReader, WireWriter};
use crate::wire::error::{WireError, WireResult};
use crate::wire::protocol::{ProtocolVersions, ServiceFlags};
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

// =============================================================================
// Constants
// =============================================================================

const TIMESTAMP_SIZE: u32 = 8;
const SERVICES_SIZE: u32 = 8;
const ADDRESS_TYPE_SIZE: u32 = 1;
const PORT_SIZE: u32 = 2;

/// Widest address field before Tor v3 relay (IPv6)
const MAX_ADDRESS_SIZE_PRE_TOR_V3: u32 = 16;

/// Widest address field once Tor v3 is relayed
const MAX_ADDRESS_SIZE: u32 = 32;

// =============================================================================
// Address Type
// =============================================================================

/// Network an address record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetAddressType {
    /// Unrecognized discriminant; only ever produced by decoding
    Unknown(u8),
    IPv4,
    IPv6,
    TorV3,
}

impl NetAddressType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => NetAddressType::IPv4,
            2 => NetAddressType::IPv6,
            3 => NetAddressType::TorV3,
            other => NetAddressType::Unknown(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            NetAddressType::Unknown(value) => value,
            NetAddressType::IPv4 => 1,
            NetAddressType::IPv6 => 2,
            NetAddressType::TorV3 => 3,
        }
    }

    /// Width of the address field, if the type is known
    pub fn address_len(self) -> Option<usize> {
        match self {
            NetAddressType::IPv4 => Some(4),
            NetAddressType::IPv6 => Some(16),
            NetAddressType::TorV3 => Some(32),
            NetAddressType::Unknown(_) => None,
        }
    }

    /// Address width usable at `pver`, or `None` if the type is invalid there
    fn wire_len(self, pver: u32, versions: &ProtocolVersions) -> Option<usize> {
        match self {
            NetAddressType::TorV3 if !versions.relays_tor_v3(pver) => None,
            other => other.address_len(),
        }
    }
}

impl fmt::Display for NetAddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetAddressType::Unknown(value) => write!(f, "unknown({})", value),
            NetAddressType::IPv4 => write!(f, "ipv4"),
            NetAddressType::IPv6 => write!(f, "ipv6"),
            NetAddressType::TorV3 => write!(f, "torv3"),
        }
    }
}

// =============================================================================
// Network Address
// =============================================================================

/// A peer address as carried on the wire
///
/// Construction does no validation; the address width is checked against
/// the type only when the record is encoded or decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetAddressV2 {
    /// Network the address belongs to
    pub kind: NetAddressType,
    /// Raw address bytes
    pub addr: Vec<u8>,
    /// Port, little-endian on the wire
    pub port: u16,
    /// Last time the address was seen, in Unix seconds
    pub timestamp: i64,
    /// Services advertised by the peer
    pub services: ServiceFlags,
}

impl NetAddressV2 {
    pub fn new(
        kind: NetAddressType,
        addr: Vec<u8>,
        port: u16,
        timestamp: i64,
        services: ServiceFlags,
    ) -> Self {
        Self {
            kind,
            addr,
            port,
            timestamp,
            services,
        }
    }

    /// Build a record for an IP address, stamped with the current time
    pub fn from_ip(ip: IpAddr, port: u16, services: ServiceFlags) -> Self {
        let (kind, addr) = match ip {
            IpAddr::V4(v4) => (NetAddressType::IPv4, v4.octets().to_vec()),
            IpAddr::V6(v6) => (NetAddressType::IPv6, v6.octets().to_vec()),
        };
        Self::new(kind, addr, port, Utc::now().timestamp(), services)
    }

    /// The address as an IP address, for IPv4 and IPv6 records
    pub fn ip_addr(&self) -> Option<IpAddr> {
        match self.kind {
            NetAddressType::IPv4 => {
                let octets: [u8; 4] = self.addr.as_slice().try_into().ok()?;
                Some(IpAddr::V4(Ipv4Addr::from(octets)))
            }
            NetAddressType::IPv6 => {
                let octets: [u8; 16] = self.addr.as_slice().try_into().ok()?;
                Some(IpAddr::V6(Ipv6Addr::from(octets)))
            }
            _ => None,
        }
    }

    /// Timestamp as a date, if representable
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Read one record
    ///
    /// Field order: timestamp, services, type, address, port.
    pub fn decode<R: Read>(
        r: &mut WireReader<'_, R>,
        pver: u32,
        versions: &ProtocolVersions,
    ) -> WireResult<Self> {
        let timestamp: i64 = r.read("timestamp")?;
        let services: ServiceFlags = r.read("services")?;
        let type_byte: u8 = r.read("address type")?;
        let kind = NetAddressType::from_u8(type_byte);

        let len = kind
            .wire_len(pver, versions)
            .ok_or(WireError::InvalidDiscriminant {
                command: r.command(),
                field: "address type",
                value: type_byte,
                pver,
            })?;
        let mut addr = vec![0u8; len];
        r.read_exact(&mut addr, "address")?;

        let port: u16 = r.read("port")?;

        Ok(Self {
            kind,
            addr,
            port,
            timestamp,
            services,
        })
    }

    /// Check that this record can be written at `pver`
    ///
    /// Returns the width of the address field. Fails for a type that is
    /// invalid at `pver` or an address whose length doesn't match its type.
    pub fn check_encodable(
        &self,
        command: &'static str,
        pver: u32,
        versions: &ProtocolVersions,
    ) -> WireResult<usize> {
        let len = self
            .kind
            .wire_len(pver, versions)
            .ok_or(WireError::InvalidDiscriminant {
                command,
                field: "address type",
                value: self.kind.to_u8(),
                pver,
            })?;
        if self.addr.len() != len {
            return Err(WireError::InvalidAddressLength {
                command,
                kind: self.kind.to_u8(),
                len: self.addr.len(),
                expected: len,
            });
        }
        Ok(len)
    }

    /// Write this record
    ///
    /// Nothing is written if [`check_encodable`](Self::check_encodable) fails.
    pub fn encode<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        pver: u32,
        versions: &ProtocolVersions,
    ) -> WireResult<()> {
        self.check_encodable(w.command(), pver, versions)?;

        w.write(&self.timestamp, "timestamp")?;
        w.write(&self.services, "services")?;
        w.write(&self.kind.to_u8(), "address type")?;
        w.write_all(&self.addr, "address")?;
        w.write(&self.port, "port")
    }

    /// Largest encoded record at `pver`
    pub fn max_payload_length(pver: u32, versions: &ProtocolVersions) -> u32 {
        let max_address = if versions.relays_tor_v3(pver) {
            MAX_ADDRESS_SIZE
        } else {
            MAX_ADDRESS_SIZE_PRE_TOR_V3
        };
        TIMESTAMP_SIZE + SERVICES_SIZE + ADDRESS_TYPE_SIZE + max_address + PORT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::error::ErrorKind;
    use crate::wire::protocol::PROTOCOL_VERSION;

    const TOR_V3_BYTES: [u8; 32] = [
        0xb8, 0x39, 0x1d, 0x20, 0x03, 0xbb, 0x3b, 0xd2, 0x85, 0xb0, 0x35, 0xac, 0x8e, 0xb3, 0x0c,
        0x80, 0xc4, 0xe2, 0xa2, 0x9b, 0xb7, 0xa2, 0xf0, 0xce, 0x0d, 0xf8, 0x74, 0x3c, 0x37, 0xec,
        0x35, 0x93,
    ];

    fn record(kind: NetAddressType, addr: &[u8], port: u16) -> NetAddressV2 {
        NetAddressV2::new(kind, addr.to_vec(), port, 0x495f_ab29, ServiceFlags::NODE_NETWORK)
    }

    fn encode(na: &NetAddressV2, pver: u32) -> WireResult<Vec<u8>> {
        let mut buf = Vec::new();
        na.encode(
            &mut WireWriter::new(&mut buf, "addrv2"),
            pver,
            &ProtocolVersions::default(),
        )?;
        Ok(buf)
    }

    fn decode(bytes: &[u8], pver: u32) -> WireResult<NetAddressV2> {
        let mut cursor = bytes;
        NetAddressV2::decode(
            &mut WireReader::new(&mut cursor, "addrv2"),
            pver,
            &ProtocolVersions::default(),
        )
    }

    #[test]
    fn test_ipv4_vector() {
        let na = record(NetAddressType::IPv4, &[127, 0, 0, 1], 9108);
        let bytes = encode(&na, PROTOCOL_VERSION).unwrap();
        assert_eq!(
            hex::encode(&bytes),
            "29ab5f4900000000010000000000000001\
             7f000001\
             9423"
        );
        assert_eq!(bytes.len(), 23);
        assert_eq!(decode(&bytes, PROTOCOL_VERSION).unwrap(), na);
    }

    #[test]
    fn test_ipv6_round_trip() {
        let ip: Ipv6Addr = "2620:100::1".parse().unwrap();
        let na = record(NetAddressType::IPv6, &ip.octets(), 9109);
        let bytes = encode(&na, PROTOCOL_VERSION).unwrap();
        assert_eq!(bytes.len(), 35);
        assert_eq!(&bytes[33..], &[0x95, 0x23]);
        assert_eq!(decode(&bytes, PROTOCOL_VERSION).unwrap(), na);
    }

    #[test]
    fn test_tor_v3_gated_by_version() {
        let versions = ProtocolVersions::default();
        let na = record(NetAddressType::TorV3, &TOR_V3_BYTES, 19108);

        let err = encode(&na, versions.tor_v3_relay - 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDiscriminant);

        let bytes = encode(&na, versions.tor_v3_relay).unwrap();
        assert_eq!(bytes.len(), 51);
        assert_eq!(&bytes[17..49], &TOR_V3_BYTES);

        let err = decode(&bytes, versions.tor_v3_relay - 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDiscriminant);
        assert_eq!(decode(&bytes, versions.tor_v3_relay).unwrap(), na);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let na = record(NetAddressType::Unknown(0), &[1, 2, 3, 4], 1);
        assert!(matches!(
            encode(&na, PROTOCOL_VERSION),
            Err(WireError::InvalidDiscriminant { value: 0, .. })
        ));

        let mut bytes = encode(&record(NetAddressType::IPv4, &[1, 2, 3, 4], 1), PROTOCOL_VERSION)
            .unwrap();
        bytes[16] = 0x09;
        assert!(matches!(
            decode(&bytes, PROTOCOL_VERSION),
            Err(WireError::InvalidDiscriminant { value: 9, .. })
        ));
    }

    #[test]
    fn test_address_length_must_match_type() {
        let versions = ProtocolVersions::default();
        let ip: Ipv6Addr = "2001:4860::8888".parse().unwrap();
        let na = record(NetAddressType::IPv4, &ip.octets(), 9108);
        assert!(matches!(
            encode(&na, PROTOCOL_VERSION),
            Err(WireError::InvalidAddressLength {
                kind: 1,
                len: 16,
                expected: 4,
                ..
            })
        ));

        let short_tor = record(NetAddressType::TorV3, &TOR_V3_BYTES[..10], 1);
        let err = encode(&short_tor, versions.tor_v3_relay).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAddressLength);

        let mut buf = Vec::new();
        let err = na
            .encode(&mut WireWriter::new(&mut buf, "addrv2"), PROTOCOL_VERSION, &versions)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAddressLength);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_truncated_port() {
        let na = record(NetAddressType::IPv4, &[1, 2, 3, 4], 1);
        let bytes = encode(&na, PROTOCOL_VERSION).unwrap();
        let err = decode(&bytes[..22], PROTOCOL_VERSION).unwrap_err();
        assert!(matches!(
            err,
            WireError::TruncatedInput { field: "port", .. }
        ));
    }

    #[test]
    fn test_timestamp_out_of_chrono_range_round_trips() {
        let mut na = record(NetAddressType::IPv4, &[1, 2, 3, 4], 1);
        na.timestamp = i64::MIN;
        let bytes = encode(&na, PROTOCOL_VERSION).unwrap();
        let decoded = decode(&bytes, PROTOCOL_VERSION).unwrap();
        assert_eq!(decoded.timestamp, i64::MIN);
        assert!(decoded.last_seen().is_none());
    }

    #[test]
    fn test_max_payload_length() {
        let versions = ProtocolVersions::default();
        assert_eq!(NetAddressV2::max_payload_length(10, &versions), 35);
        assert_eq!(NetAddressV2::max_payload_length(11, &versions), 51);
    }

    #[test]
    fn test_ip_addr_conversion() {
        let na = NetAddressV2::from_ip("8.8.8.8".parse().unwrap(), 9108, ServiceFlags::empty());
        assert_eq!(na.kind, NetAddressType::IPv4);
        assert_eq!(na.ip_addr(), Some("8.8.8.8".parse().unwrap()));

        let tor = record(NetAddressType::TorV3, &TOR_V3_BYTES, 1);
        assert_eq!(tor.ip_addr(), None);
    }
}
