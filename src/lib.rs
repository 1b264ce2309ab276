//! IPv6 Neighbor Discovery Protocol engine.
//!
//! Implements the wire-format parsing/construction and receive/transmit
//! rules of RFC 4861 (Neighbor Discovery), RFC 4862 (SLAAC signaling),
//! RFC 4429 (optimistic DAD) and RFC 4191 (route preference). The engine
//! owns no device, no routing table and no neighbor cache storage: those
//! are supplied by the integrator through the traits in [`collab`].
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod addr;
pub mod afpolicy;
pub mod collab;
pub mod emit;
pub mod engine;
pub mod error;
pub mod logger;
pub mod message;
pub mod options;
pub mod params;
pub mod proxy;
pub mod reachability;
pub mod recv;
#[cfg(test)]
mod test_support;
pub mod wrand;

pub use addr::{Ipv6Addr, LinkAddr};
pub use collab::{CacheEntry, NeighborFlags, NeighborState};
pub use engine::NdpEngine;
pub use error::{ConfigError, DropReason, OptionError};
pub use params::{LinkType, NeighborParams};
