//! UDP transport for caniot discovery
//!
//! Each lookup owns one socket bound to a randomly drawn local port, with
//! broadcast and address reuse enabled. Dropping the transport closes the
//! socket.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use caniot_discovery_core::constants::{EPHEMERAL_PORT_RANGE, MAX_BIND_ATTEMPTS};

use crate::{Transport, error::*};

/// Lookup-scoped UDP socket
pub struct UdpTransport {
    socket: Option<UdpSocket>,
    local_addr: Option<SocketAddr>,
}

impl UdpTransport {
    /// Bind to a random port in the dynamic/private range
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bind_ephemeral() -> Result<Self> {
        Self::bind_in_range(EPHEMERAL_PORT_RANGE)
    }

    /// Bind to a port drawn uniformly at random from `ports`
    ///
    /// A new port is drawn when the previous one is in use, up to
    /// [`MAX_BIND_ATTEMPTS`] times.
    pub fn bind_in_range(ports: RangeInclusive<u16>) -> Result<Self> {
        let (start, end) = (*ports.start(), *ports.end());
        if start > end || start == 0 {
            return Err(Error::InvalidPortRange { start, end });
        }

        for attempt in 1..=MAX_BIND_ATTEMPTS {
            let port = fastrand::u16(start..=end);

            match Self::bind(port) {
                Ok(transport) => return Ok(transport),
                Err(Error::Io(e)) if e.kind() == io::ErrorKind::AddrInUse => {
                    debug!("Port {} in use (attempt {}/{})", port, attempt, MAX_BIND_ATTEMPTS);
                }
                Err(e) => return Err(e),
            }
        }

        warn!("Could not bind a port in {}..={}", start, end);
        Err(Error::PortUnavailable {
            attempts: MAX_BIND_ATTEMPTS,
        })
    }

    /// Bind to a specific local port on all interfaces
    pub fn bind(port: u16) -> Result<Self> {
        let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));

        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.set_broadcast(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&bind_addr.into())?;

        let socket = UdpSocket::from_std(socket.into())?;
        let local_addr = socket.local_addr()?;

        debug!("Bound discovery socket to {}", local_addr);

        Ok(Self {
            socket: Some(socket),
            local_addr: Some(local_addr),
        })
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send_to(&mut self, data: &[u8], target: SocketAddr) -> Result<()> {
        let socket = self.socket.as_ref().ok_or(Error::NotBound)?;

        trace!(
            "Sending {} bytes to {}: {:02X?}",
            data.len(),
            target,
            &data[..data.len().min(32)]
        );

        socket.send_to(data, target).await?;

        Ok(())
    }

    async fn recv_from(
        &mut self,
        max_len: usize,
        timeout_duration: Duration,
    ) -> Result<(BytesMut, SocketAddr)> {
        let socket = self.socket.as_ref().ok_or(Error::NotBound)?;

        let mut buf = BytesMut::zeroed(max_len);

        let (n, peer) = timeout(timeout_duration, socket.recv_from(&mut buf))
            .await
            .map_err(|_| {
                warn!("No reply after {:?}", timeout_duration);
                Error::ReadTimeout {
                    timeout: timeout_duration,
                }
            })?
            .map_err(|e| {
                warn!("Receive error: {}", e);
                Error::Io(e)
            })?;

        // Truncate to actual received size
        buf.truncate(n);

        trace!("Received {} bytes from {}: {:02X?}", n, peer, &buf[..]);

        Ok((buf, peer))
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!("Released discovery socket {:?}", self.local_addr);
        }
    }

    fn is_bound(&self) -> bool {
        self.socket.is_some()
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.close();
    }
}
