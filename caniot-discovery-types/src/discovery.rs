//! Outcome of a successful lookup

use std::fmt;
use std::net::SocketAddr;

use bytes::Bytes;

use crate::ControllerInfo;

/// Result of one discovery exchange
///
/// Holds the transport address the reply came from, the reply bytes
/// exactly as received, and the parsed controller information. The
/// sender address and the advertised address may differ (NAT, multi-homed
/// controllers), so both are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Sender of the reply
    pub peer: SocketAddr,

    /// Reply payload as received
    pub raw: Bytes,

    /// Parsed reply
    pub controller: ControllerInfo,
}

impl Discovery {
    pub fn new(peer: SocketAddr, raw: Bytes, controller: ControllerInfo) -> Self {
        Self {
            peer,
            raw,
            controller,
        }
    }

    /// Split into `(peer, raw, controller)`
    pub fn into_parts(self) -> (SocketAddr, Bytes, ControllerInfo) {
        (self.peer, self.raw, self.controller)
    }
}

impl fmt::Display for Discovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Received {} bytes from {} : {}",
            self.raw.len(),
            self.peer,
            self.controller
        )
    }
}
