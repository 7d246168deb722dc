//! Network categories, routability and group keys
//!
//! Ranges are matched per address family: an IPv4-mapped IPv6 address is
//! not inside any IPv4 block, with the single exception of loopback.

use crate::wire::netaddress::NetAddressV2;
use serde::Serialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

// =============================================================================
// Prefixes
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Prefix {
    V4(Ipv4Addr, u32),
    V6(Ipv6Addr, u32),
}

impl Prefix {
    fn contains(&self, addr: &IpAddr) -> bool {
        match (self, addr) {
            (Prefix::V4(net, bits), IpAddr::V4(ip)) => {
                mask_v4(u32::from(*ip), *bits) == u32::from(*net)
            }
            (Prefix::V6(net, bits), IpAddr::V6(ip)) => {
                mask_v6(u128::from(*ip), *bits) == u128::from(*net)
            }
            _ => false,
        }
    }
}

fn mask_v4(value: u32, bits: u32) -> u32 {
    value & u32::MAX.checked_shl(32 - bits).unwrap_or(0)
}

fn mask_v6(value: u128, bits: u32) -> u128 {
    value & u128::MAX.checked_shl(128 - bits).unwrap_or(0)
}

const fn v4(a: u8, b: u8, c: u8, d: u8, bits: u32) -> Prefix {
    Prefix::V4(Ipv4Addr::new(a, b, c, d), bits)
}

const fn v6(a: u16, b: u16, c: u16, bits: u32) -> Prefix {
    Prefix::V6(Ipv6Addr::new(a, b, c, 0, 0, 0, 0, 0), bits)
}

/// Private networks
const RFC1918: [Prefix; 3] = [v4(10, 0, 0, 0, 8), v4(172, 16, 0, 0, 12), v4(192, 168, 0, 0, 16)];

/// Benchmarking
const RFC2544: Prefix = v4(198, 18, 0, 0, 15);

/// IPv6 documentation
const RFC3849: Prefix = v6(0x2001, 0x0db8, 0, 32);

/// IPv4 link-local autoconfiguration
const RFC3927: Prefix = v4(169, 254, 0, 0, 16);

/// 6to4
const RFC3964: Prefix = v6(0x2002, 0, 0, 16);

/// Unique local
const RFC4193: Prefix = v6(0xfc00, 0, 0, 7);

/// Teredo
const RFC4380: Prefix = v6(0x2001, 0, 0, 32);

/// ORCHID
const RFC4843: Prefix = v6(0x2001, 0x0010, 0, 28);

/// IPv6 link-local autoconfiguration
const RFC4862: Prefix = v6(0xfe80, 0, 0, 64);

/// IPv4 documentation
const RFC5737: [Prefix; 3] = [
    v4(192, 0, 2, 0, 24),
    v4(198, 51, 100, 0, 24),
    v4(203, 0, 113, 0, 24),
];

/// NAT64 well-known prefix
const RFC6052: Prefix = Prefix::V6(Ipv6Addr::new(0x64, 0xff9b, 0, 0, 0, 0, 0, 0), 96);

/// IPv4-translated
const RFC6145: Prefix = Prefix::V6(Ipv6Addr::new(0, 0, 0, 0, 0xffff, 0, 0, 0), 96);

/// Carrier-grade NAT shared space
const RFC6598: Prefix = v4(100, 64, 0, 0, 10);

/// OnionCat encoding of Tor v2 key hashes, inside RFC4193
const ONION_CAT: Prefix = v6(0xfd87, 0xd87e, 0xeb43, 48);

const ZERO_V4: Prefix = v4(0, 0, 0, 0, 8);

/// Hurricane Electric, grouped at /36 instead of /32
const HE_NET: Prefix = v6(0x2001, 0x0470, 0, 32);

// =============================================================================
// Classification
// =============================================================================

/// Network an address belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AddressCategory {
    Local,
    IPv4,
    IPv6,
    /// Tor v2 onion service encoded as OnionCat IPv6
    TorV2,
}

impl fmt::Display for AddressCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressCategory::Local => write!(f, "local"),
            AddressCategory::IPv4 => write!(f, "ipv4"),
            AddressCategory::IPv6 => write!(f, "ipv6"),
            AddressCategory::TorV2 => write!(f, "torv2"),
        }
    }
}

fn is_loopback(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => ip.is_loopback(),
        IpAddr::V6(ip) => match ip.to_ipv4_mapped() {
            Some(mapped) => mapped.is_loopback(),
            None => ip.is_loopback(),
        },
    }
}

fn is_onion_cat(addr: &IpAddr) -> bool {
    ONION_CAT.contains(addr)
}

/// Loopback or inside 0.0.0.0/8
pub fn is_local(addr: &IpAddr) -> bool {
    is_loopback(addr) || ZERO_V4.contains(addr)
}

/// Neither unspecified nor the IPv4 broadcast address
pub fn is_valid(addr: &IpAddr) -> bool {
    !addr.is_unspecified() && *addr != IpAddr::V4(Ipv4Addr::BROADCAST)
}

/// Category of `addr`
pub fn classify(addr: &IpAddr) -> AddressCategory {
    if is_local(addr) {
        AddressCategory::Local
    } else if addr.is_ipv4() {
        AddressCategory::IPv4
    } else if is_onion_cat(addr) {
        AddressCategory::TorV2
    } else {
        AddressCategory::IPv6
    }
}

/// Whether `addr` is reachable over the public internet
pub fn is_routable(addr: &IpAddr) -> bool {
    let reserved = RFC1918.iter().any(|p| p.contains(addr))
        || RFC2544.contains(addr)
        || RFC3927.contains(addr)
        || RFC4862.contains(addr)
        || RFC3849.contains(addr)
        || RFC4843.contains(addr)
        || RFC5737.iter().any(|p| p.contains(addr))
        || RFC6598.contains(addr)
        || is_local(addr)
        || (RFC4193.contains(addr) && !is_onion_cat(addr));

    is_valid(addr) && !reserved
}

fn group_v4(octets: [u8; 4]) -> String {
    Ipv4Addr::new(octets[0], octets[1], 0, 0).to_string()
}

fn embedded_v4(bytes: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&bytes[..4]);
    out
}

/// Network group used to diversify peer connections
///
/// One of:
/// - `"local"` or `"unroutable"`
/// - the /16 network of an IPv4 address, including IPv4 embedded in
///   NAT64, IPv4-translated, 6to4 and Teredo addresses
/// - `"tor:N"` where N is the low four bits of byte 6
/// - the /32 network of any other IPv6 address (/36 for he.net)
pub fn group_key(addr: &IpAddr) -> String {
    if is_local(addr) {
        return "local".to_string();
    }
    if !is_routable(addr) {
        return "unroutable".to_string();
    }

    let ip = match addr {
        IpAddr::V4(ip) => return group_v4(ip.octets()),
        IpAddr::V6(ip) => ip,
    };
    let b = ip.octets();

    if RFC6145.contains(addr) || RFC6052.contains(addr) {
        return group_v4(embedded_v4(&b[12..16]));
    }
    if RFC3964.contains(addr) {
        return group_v4(embedded_v4(&b[2..6]));
    }
    if RFC4380.contains(addr) {
        let mut teredo = embedded_v4(&b[12..16]);
        for byte in teredo.iter_mut() {
            *byte ^= 0xff;
        }
        return group_v4(teredo);
    }
    if is_onion_cat(addr) {
        return format!("tor:{}", b[6] & 0x0f);
    }

    let bits = if HE_NET.contains(addr) { 36 } else { 32 };
    Ipv6Addr::from(mask_v6(u128::from(*ip), bits)).to_string()
}

// =============================================================================
// Summary
// =============================================================================

/// Everything the classifier says about one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressInfo {
    pub address: IpAddr,
    pub category: AddressCategory,
    pub routable: bool,
    pub group: String,
}

impl AddressInfo {
    pub fn new(address: IpAddr) -> Self {
        Self {
            address,
            category: classify(&address),
            routable: is_routable(&address),
            group: group_key(&address),
        }
    }

    /// Classify a wire record; `None` for address types without an IP form
    pub fn from_record(record: &NetAddressV2) -> Option<Self> {
        record.ip_addr().map(Self::new)
    }
}
