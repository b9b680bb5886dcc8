//! Protocol constants for caniot controller discovery

use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Well-known UDP port the controller listens on for search requests
pub const DISCOVERY_PORT: u16 = 5000;

/// Search request payload, sent verbatim with no framing
pub const SEARCH_REQUEST: &[u8] = b"Search caniot-controller";

/// Limited broadcast address, the default lookup target
pub const BROADCAST_ADDR: Ipv4Addr = Ipv4Addr::BROADCAST;

/// Maximum number of bytes read from a discovery reply
pub const MAX_RESPONSE_SIZE: usize = 32;

/// Size of the address field at the start of a reply
pub const ADDRESS_SIZE: usize = 4;

/// Default time to wait for a reply
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Dynamic/private port range (RFC 6335) used for the source port draw
pub const EPHEMERAL_PORT_RANGE: RangeInclusive<u16> = 49152..=65535;

/// Source port range historically declared by the discovery tooling.
///
/// Never used as a default; kept for callers that must stay inside it.
pub const LEGACY_SOURCE_PORT_RANGE: RangeInclusive<u16> = 10000..=65000;

/// Number of port draws attempted before giving up on binding
pub const MAX_BIND_ATTEMPTS: usize = 3;
