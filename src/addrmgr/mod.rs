//! Address classification for peer selection
//!
//! Pure functions used by an address store to decide which addresses are
//! worth keeping and to spread outbound connections across network groups.

pub mod network;

pub use network::{
    classify, group_key, is_local, is_routable, is_valid, AddressCategory, AddressInfo,
};
