//! addrv2 message
//!
//! Carries between 1 and [`MAX_ADDR_PER_V2_MSG`] peer address records.
//! Both encode and decode reject empty and over-full lists.

use crate::wire::codec::{compact_size_len, WireReader, WireWriter};
use crate::wire::error::{WireError, WireResult};
use crate::wire::message::{WireMessage, CMD_ADDR_V2};
use crate::wire::netaddress::NetAddressV2;
use crate::wire::protocol::ProtocolVersions;
use std::io::{Read, Write};

/// Maximum number of addresses in a single addrv2 message
pub const MAX_ADDR_PER_V2_MSG: usize = 1000;

/// A list of known peer addresses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsgAddrV2 {
    addr_list: Vec<NetAddressV2>,
}

impl MsgAddrV2 {
    pub fn new() -> Self {
        Self {
            addr_list: Vec::new(),
        }
    }

    /// Addresses in message order
    pub fn addresses(&self) -> &[NetAddressV2] {
        &self.addr_list
    }

    pub fn len(&self) -> usize {
        self.addr_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addr_list.is_empty()
    }

    /// Add an address, failing once the message is full
    pub fn add(&mut self, addr: NetAddressV2) -> WireResult<()> {
        if self.addr_list.len() >= MAX_ADDR_PER_V2_MSG {
            return Err(WireError::CountOutOfRange {
                command: CMD_ADDR_V2,
                count: self.addr_list.len() as u64 + 1,
                min: 1,
                max: MAX_ADDR_PER_V2_MSG as u64,
            });
        }
        self.addr_list.push(addr);
        Ok(())
    }

    /// Add addresses in order, stopping at the first failure
    ///
    /// Addresses added before the failure stay in the message.
    pub fn add_many<I>(&mut self, addrs: I) -> WireResult<()>
    where
        I: IntoIterator<Item = NetAddressV2>,
    {
        for addr in addrs {
            self.add(addr)?;
        }
        Ok(())
    }

    /// Remove all addresses
    pub fn clear(&mut self) {
        self.addr_list.clear();
    }

    fn check_count(count: u64) -> WireResult<()> {
        if count == 0 || count > MAX_ADDR_PER_V2_MSG as u64 {
            log::debug!("Rejecting addrv2 with {} addresses", count);
            return Err(WireError::CountOutOfRange {
                command: CMD_ADDR_V2,
                count,
                min: 1,
                max: MAX_ADDR_PER_V2_MSG as u64,
            });
        }
        Ok(())
    }
}

impl WireMessage for MsgAddrV2 {
    const COMMAND: &'static str = CMD_ADDR_V2;

    fn min_version(versions: &ProtocolVersions) -> u32 {
        versions.addr_v2
    }

    fn max_payload_length(&self, pver: u32, versions: &ProtocolVersions) -> u32 {
        if pver < versions.addr_v2 {
            return 0;
        }
        compact_size_len(MAX_ADDR_PER_V2_MSG as u64) as u32
            + MAX_ADDR_PER_V2_MSG as u32 * NetAddressV2::max_payload_length(pver, versions)
    }

    fn decode_payload<R: Read>(
        r: &mut WireReader<'_, R>,
        pver: u32,
        versions: &ProtocolVersions,
    ) -> WireResult<Self> {
        let count = r.read_compact_size("address count")?;
        Self::check_count(count)?;

        let mut msg = Self {
            addr_list: Vec::with_capacity(count as usize),
        };
        for _ in 0..count {
            msg.add(NetAddressV2::decode(r, pver, versions)?)?;
        }
        Ok(msg)
    }

    fn encode_payload<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        pver: u32,
        versions: &ProtocolVersions,
    ) -> WireResult<()> {
        let count = self.addr_list.len() as u64;
        Self::check_count(count)?;
        for addr in &self.addr_list {
            addr.check_encodable(w.command(), pver, versions)?;
        }

        w.write_compact_size(count, "address count")?;
        for addr in &self.addr_list {
            addr.encode(w, pver, versions)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::error::ErrorKind;
    use crate::wire::netaddress::NetAddressType;
    use crate::wire::protocol::{ServiceFlags, PROTOCOL_VERSION};

    const TOR_V3_BYTES: [u8; 32] = [
        0xb8, 0x39, 0x1d, 0x20, 0x03, 0xbb, 0x3b, 0xd2, 0x85, 0xb0, 0x35, 0xac, 0x8e, 0xb3, 0x0c,
        0x80, 0xc4, 0xe2, 0xa2, 0x9b, 0xb7, 0xa2, 0xf0, 0xce, 0x0d, 0xf8, 0x74, 0x3c, 0x37, 0xec,
        0x35, 0x93,
    ];

    fn ipv4_address() -> NetAddressV2 {
        NetAddressV2::new(
            NetAddressType::IPv4,
            vec![0x7f, 0x00, 0x00, 0x01],
            9108,
            0x495f_ab29,
            ServiceFlags::NODE_NETWORK,
        )
    }

    fn torv3_address() -> NetAddressV2 {
        NetAddressV2::new(
            NetAddressType::TorV3,
            TOR_V3_BYTES.to_vec(),
            19108,
            0x495f_ab29,
            ServiceFlags::NODE_NETWORK,
        )
    }

    fn full_message(count: usize) -> MsgAddrV2 {
        let mut msg = MsgAddrV2::new();
        msg.add_many(std::iter::repeat(ipv4_address()).take(count))
            .unwrap();
        msg
    }

    #[test]
    fn test_command_and_max_payload() {
        let versions = ProtocolVersions::default();
        let msg = MsgAddrV2::new();
        assert_eq!(msg.command(), "addrv2");
        assert_eq!(msg.max_payload_length(versions.addr_v2 - 1, &versions), 0);
        assert_eq!(msg.max_payload_length(versions.addr_v2, &versions), 35003);
        assert_eq!(msg.max_payload_length(versions.tor_v3_relay, &versions), 51003);
        assert_eq!(msg.max_payload_length(PROTOCOL_VERSION, &versions), 51003);
    }

    #[test]
    fn test_add_and_clear() {
        let mut msg = MsgAddrV2::new();
        msg.add(ipv4_address()).unwrap();
        assert_eq!(msg.addresses()[0], ipv4_address());

        msg.clear();
        assert!(msg.is_empty());

        let msg = full_message(MAX_ADDR_PER_V2_MSG);
        assert_eq!(msg.len(), MAX_ADDR_PER_V2_MSG);
    }

    #[test]
    fn test_add_fails_when_full() {
        let mut msg = full_message(MAX_ADDR_PER_V2_MSG);
        let err = msg.add(ipv4_address()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CountOutOfRange);
        assert_eq!(msg.len(), MAX_ADDR_PER_V2_MSG);
    }

    #[test]
    fn test_add_many_keeps_earlier_addresses() {
        let mut msg = full_message(MAX_ADDR_PER_V2_MSG - 2);
        let err = msg
            .add_many(std::iter::repeat(ipv4_address()).take(5))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CountOutOfRange);
        assert_eq!(msg.len(), MAX_ADDR_PER_V2_MSG);
    }

    #[test]
    fn test_wire_multiple_addresses() {
        let versions = ProtocolVersions::default();
        let mut msg = MsgAddrV2::new();
        msg.add_many(vec![ipv4_address(), torv3_address()]).unwrap();

        let bytes = msg.to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(bytes[0], 0x02);
        assert_eq!(bytes.len(), 1 + 23 + 51);
        assert_eq!(
            hex::encode(&bytes[1..24]),
            "29ab5f4900000000010000000000000001\
             7f000001\
             9423"
        );

        let (decoded, consumed) =
            MsgAddrV2::from_bytes(&bytes, PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_exactly_max_addresses() {
        let versions = ProtocolVersions::default();
        let msg = full_message(MAX_ADDR_PER_V2_MSG);
        let bytes = msg.to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(&bytes[..3], &[0xfd, 0xe8, 0x03]);

        let (decoded, _) = MsgAddrV2::from_bytes(&bytes, PROTOCOL_VERSION, &versions).unwrap();
        assert_eq!(decoded.len(), MAX_ADDR_PER_V2_MSG);
    }

    #[test]
    fn test_empty_rejected_both_ways() {
        let versions = ProtocolVersions::default();
        let err = MsgAddrV2::new()
            .to_bytes(PROTOCOL_VERSION, &versions)
            .unwrap_err();
        assert!(matches!(err, WireError::CountOutOfRange { count: 0, .. }));

        let err = MsgAddrV2::from_bytes(&[0x00], PROTOCOL_VERSION, &versions).unwrap_err();
        assert!(matches!(err, WireError::CountOutOfRange { count: 0, .. }));
    }

    #[test]
    fn test_too_many_rejected_both_ways() {
        let versions = ProtocolVersions::default();

        let mut msg = full_message(MAX_ADDR_PER_V2_MSG);
        msg.addr_list.push(ipv4_address());
        let mut buf = Vec::new();
        let err = msg.encode(&mut buf, PROTOCOL_VERSION, &versions).unwrap_err();
        assert!(matches!(err, WireError::CountOutOfRange { count: 1001, .. }));
        assert!(buf.is_empty());

        // Count prefix alone: rejected before any record is read
        let err = MsgAddrV2::from_bytes(&[0xfd, 0xe9, 0x03], PROTOCOL_VERSION, &versions)
            .unwrap_err();
        assert!(matches!(err, WireError::CountOutOfRange { count: 1001, .. }));
    }

    #[test]
    fn test_version_gating() {
        let versions = ProtocolVersions::default();
        let msg = full_message(1);
        let pver = versions.addr_v2 - 1;

        let mut buf = Vec::new();
        let err = msg.encode(&mut buf, pver, &versions).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionTooLow);
        assert!(buf.is_empty());

        let bytes = msg.to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        let err = MsgAddrV2::from_bytes(&bytes, pver, &versions).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionTooLow);
    }

    #[test]
    fn test_tor_v3_list_below_relay_version() {
        let versions = ProtocolVersions::default();
        let mut msg = MsgAddrV2::new();
        msg.add(torv3_address()).unwrap();

        let err = msg.to_bytes(versions.addr_v2, &versions).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDiscriminant);

        let bytes = msg.to_bytes(versions.tor_v3_relay, &versions).unwrap();
        let err = MsgAddrV2::from_bytes(&bytes, versions.addr_v2, &versions).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDiscriminant);
    }

    #[test]
    fn test_rejected_list_writes_nothing() {
        let versions = ProtocolVersions::default();
        let mut msg = MsgAddrV2::new();
        msg.add_many(vec![ipv4_address(), torv3_address()]).unwrap();

        let mut buf = Vec::new();
        let err = msg.encode(&mut buf, versions.addr_v2, &versions).unwrap_err();
        assert!(matches!(
            err,
            WireError::InvalidDiscriminant { value: 3, .. }
        ));
        assert!(buf.is_empty());

        let mut bad = ipv4_address();
        bad.addr = vec![0; 16];
        msg.clear();
        msg.add_many(vec![ipv4_address(), bad]).unwrap();
        let err = msg.encode(&mut buf, PROTOCOL_VERSION, &versions).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAddressLength);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_truncated_record() {
        let versions = ProtocolVersions::default();
        let bytes = full_message(2).to_bytes(PROTOCOL_VERSION, &versions).unwrap();
        let err = MsgAddrV2::from_bytes(&bytes[..30], PROTOCOL_VERSION, &versions).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }
}
