//! Transport layer for caniot discovery
//!
//! Provides the lookup-scoped UDP socket used for one search exchange.

pub mod error;
pub mod udp;

pub use error::{Error, Result};
pub use udp::UdpTransport;

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;

/// Datagram transport used by a discovery exchange
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one datagram to `target`
    async fn send_to(&mut self, data: &[u8], target: SocketAddr) -> Result<()>;

    /// Receive one datagram of at most `max_len` bytes, waiting up to `timeout`
    async fn recv_from(&mut self, max_len: usize, timeout: Duration) -> Result<(BytesMut, SocketAddr)>;

    /// Release the underlying socket
    fn close(&mut self);

    /// Check if a socket is held
    fn is_bound(&self) -> bool;

    /// Local address the socket is bound to
    fn local_addr(&self) -> Option<SocketAddr>;
}
