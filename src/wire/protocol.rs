//! Protocol version thresholds and service flags
//!
//! Version policy is supplied by the caller as a [`ProtocolVersions`] value
//! rather than read from module globals, so each threshold can be tested in
//! isolation.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Latest protocol version understood by this crate
pub const PROTOCOL_VERSION: u32 = 12;

/// Protocol version that introduced addrv2 messages
pub const ADDR_V2_VERSION: u32 = 10;

/// Protocol version from which Tor v3 addresses may be relayed
pub const RELAY_TOR_V3_VERSION: u32 = 11;

/// Protocol version that introduced the mixing messages
pub const MIX_VERSION: u32 = 12;

/// Maximum payload of any single protocol message (32 MiB)
pub const MAX_MESSAGE_PAYLOAD: u32 = 1024 * 1024 * 32;

// =============================================================================
// Service Flags
// =============================================================================

bitflags! {
    /// Services advertised by a peer
    ///
    /// Unknown bits are carried through decode and encode untouched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ServiceFlags: u64 {
        /// Full node serving the whole chain
        const NODE_NETWORK = 1 << 0;
        /// Supports bloom filtering
        const NODE_BLOOM = 1 << 1;
        /// Supports committed filters
        const NODE_CF = 1 << 2;
    }
}

// =============================================================================
// Version Thresholds
// =============================================================================

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid thresholds: addr_v2 {addr_v2} is above tor_v3_relay {tor_v3_relay}")]
    Unordered { addr_v2: u32, tor_v3_relay: u32 },
}

/// Minimum negotiated protocol versions for version-gated wire features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolVersions {
    /// First version accepting addrv2 messages
    pub addr_v2: u32,
    /// First version accepting 32-byte Tor v3 address records
    pub tor_v3_relay: u32,
    /// First version accepting mixing messages
    pub mix: u32,
}

impl Default for ProtocolVersions {
    fn default() -> Self {
        Self {
            addr_v2: ADDR_V2_VERSION,
            tor_v3_relay: RELAY_TOR_V3_VERSION,
            mix: MIX_VERSION,
        }
    }
}

impl ProtocolVersions {
    /// Check that the thresholds are consistent with each other
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addr_v2 > self.tor_v3_relay {
            return Err(ConfigError::Unordered {
                addr_v2: self.addr_v2,
                tor_v3_relay: self.tor_v3_relay,
            });
        }
        Ok(())
    }

    /// Load thresholds from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        let versions: ProtocolVersions = serde_json::from_str(&data)?;
        versions.validate()?;
        log::debug!("Loaded protocol versions from {}", path.display());
        Ok(versions)
    }

    /// Whether Tor v3 address records are valid at `pver`
    pub fn relays_tor_v3(&self, pver: u32) -> bool {
        pver >= self.tor_v3_relay
    }
}
