//! # caniot-discovery-core
//!
//! Wire contract for locating a caniot controller on the local network.
//!
//! This crate provides the protocol primitives:
//! - Search request payload
//! - Reply decoding
//! - Lookup state machine
//! - Protocol constants

pub mod constants;
pub mod error;
pub mod probe;
pub mod response;
pub mod state;

pub use constants::{BROADCAST_ADDR, DISCOVERY_PORT, MAX_RESPONSE_SIZE};
pub use error::{Error, Result};
pub use probe::Probe;
pub use response::{AddressByteOrder, DiscoveryResponse};
pub use state::LookupState;
