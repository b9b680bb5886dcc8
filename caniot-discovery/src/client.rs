//! Discovery client

use std::net::{Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use tracing::{debug, info, warn};

use caniot_discovery_core::{
    AddressByteOrder, DiscoveryResponse, LookupState, Probe,
    constants::{BROADCAST_ADDR, DEFAULT_TIMEOUT, DISCOVERY_PORT, EPHEMERAL_PORT_RANGE, MAX_RESPONSE_SIZE},
};
use caniot_discovery_transport::{Transport, UdpTransport};
use caniot_discovery_types::{ControllerInfo, Discovery};

use crate::error::Result;

/// caniot controller discovery client
///
/// Every lookup binds its own socket on a randomly drawn local port, sends
/// one search request and consumes exactly one reply. Nothing is shared
/// between lookups, so a single client can run any number of them
/// concurrently.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use caniot_discovery::DiscoveryClient;
///
/// #[tokio::main]
/// async fn main() -> caniot_discovery::Result<()> {
///     let client = DiscoveryClient::new().with_timeout(Duration::from_secs(2));
///
///     let discovery = client.lookup().await?;
///     println!("Controller at {}", discovery.controller.ip());
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    timeout: Duration,
    port_range: RangeInclusive<u16>,
    discovery_port: u16,
    byte_order: AddressByteOrder,
}

impl DiscoveryClient {
    /// Create a client with default settings
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            port_range: EPHEMERAL_PORT_RANGE,
            discovery_port: DISCOVERY_PORT,
            byte_order: AddressByteOrder::Native,
        }
    }

    /// Set reply timeout (default: 5s)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the range local ports are drawn from (default: 49152..=65535)
    pub fn with_port_range(mut self, port_range: RangeInclusive<u16>) -> Self {
        self.port_range = port_range;
        self
    }

    /// Set the port search requests are sent to (default: 5000)
    pub fn with_discovery_port(mut self, port: u16) -> Self {
        self.discovery_port = port;
        self
    }

    /// Set the byte order of the address in replies (default: native)
    pub fn with_byte_order(mut self, byte_order: AddressByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn port_range(&self) -> &RangeInclusive<u16> {
        &self.port_range
    }

    pub fn discovery_port(&self) -> u16 {
        self.discovery_port
    }

    pub fn byte_order(&self) -> AddressByteOrder {
        self.byte_order
    }

    /// Broadcast a search request and wait for the first reply
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Timeout`](crate::ErrorKind::Timeout) if nothing answers in time
    /// - [`ErrorKind::Decode`](crate::ErrorKind::Decode) if the reply is shorter than 4 bytes
    /// - [`ErrorKind::Socket`](crate::ErrorKind::Socket) if the local socket cannot be set up
    pub async fn lookup(&self) -> Result<Discovery> {
        self.lookup_at(BROADCAST_ADDR).await
    }

    /// Send a search request to `target` and wait for the first reply
    ///
    /// `target` may be a unicast address or a broadcast address.
    pub async fn lookup_at(&self, target: Ipv4Addr) -> Result<Discovery> {
        let target = SocketAddr::from((target, self.discovery_port));

        info!("Searching for controller via {}...", target);

        let transport = UdpTransport::bind_in_range(self.port_range.clone())?;

        Lookup::new(transport)
            .run(target, self.timeout, self.byte_order)
            .await
    }
}

impl Default for DiscoveryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// One search exchange over an owned transport
///
/// The transport is closed when the exchange reaches a terminal state,
/// and again on drop if the future is abandoned midway.
struct Lookup<T: Transport> {
    transport: T,
    state: LookupState,
}

impl<T: Transport> Lookup<T> {
    fn new(transport: T) -> Self {
        Self {
            transport,
            state: LookupState::Idle,
        }
    }

    async fn run(
        mut self,
        target: SocketAddr,
        timeout: Duration,
        byte_order: AddressByteOrder,
    ) -> Result<Discovery> {
        let outcome = self.exchange(target, timeout, byte_order).await;

        let terminal = match &outcome {
            Ok(discovery) => {
                info!("Found controller {} (reply from {})", discovery.controller.ip(), discovery.peer);
                LookupState::Completed
            }
            Err(e) => {
                warn!("Lookup via {} failed: {}", target, e);
                LookupState::Failed
            }
        };

        self.finish(terminal)?;

        outcome
    }

    async fn exchange(
        &mut self,
        target: SocketAddr,
        timeout: Duration,
        byte_order: AddressByteOrder,
    ) -> Result<Discovery> {
        self.transport.send_to(&Probe.encode(), target).await?;
        self.state = self.state.transition(LookupState::AwaitingReply)?;

        debug!("Probe sent to {}, waiting up to {:?}", target, timeout);

        let (buf, peer) = self.transport.recv_from(MAX_RESPONSE_SIZE, timeout).await?;

        debug!("Reply from {}: {}", peer, hex::encode(&buf));

        let response = DiscoveryResponse::decode(buf.freeze(), byte_order)?;
        let controller = ControllerInfo::new(response.address());

        Ok(Discovery::new(peer, response.into_raw(), controller))
    }

    fn finish(&mut self, terminal: LookupState) -> Result<()> {
        self.transport.close();
        self.state = self.state.transition(terminal)?;
        Ok(())
    }
}

impl<T: Transport> Drop for Lookup<T> {
    fn drop(&mut self) {
        if !self.state.is_terminal() {
            debug!("Lookup abandoned in state {:?}", self.state);
        }
        self.transport.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    use async_trait::async_trait;
    use bytes::{Bytes, BytesMut};
    use pretty_assertions::assert_eq;
    use tokio::net::UdpSocket;
    use tokio::task::JoinHandle;

    use caniot_discovery_core::constants::SEARCH_REQUEST;
    use caniot_discovery_transport::Error as TransportError;

    use crate::ErrorKind;

    const CONTROLLER: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 50);

    /// Loopback controller answering `count` search requests with `reply`
    async fn spawn_responder(reply: Vec<u8>, count: usize) -> (u16, JoinHandle<()>) {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = socket.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            for _ in 0..count {
                let (n, peer) = socket.recv_from(&mut buf).await.unwrap();
                assert_eq!(&buf[..n], SEARCH_REQUEST);
                socket.send_to(&reply, peer).await.unwrap();
            }
        });

        (port, handle)
    }

    /// Loopback socket that never answers
    async fn silent_responder() -> (u16, UdpSocket) {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        (socket.local_addr().unwrap().port(), socket)
    }

    fn native_reply(ip: Ipv4Addr) -> Vec<u8> {
        let mut reply = u32::from(ip).to_ne_bytes().to_vec();
        reply.extend_from_slice(&[0u8; 12]);
        reply
    }

    struct ScriptedTransport {
        reply: Option<Vec<u8>>,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send_to(
            &mut self,
            data: &[u8],
            _target: SocketAddr,
        ) -> caniot_discovery_transport::Result<()> {
            assert_eq!(data, SEARCH_REQUEST);
            Ok(())
        }

        async fn recv_from(
            &mut self,
            max_len: usize,
            timeout: Duration,
        ) -> caniot_discovery_transport::Result<(BytesMut, SocketAddr)> {
            assert_eq!(max_len, MAX_RESPONSE_SIZE);
            match self.reply.take() {
                Some(reply) => Ok((BytesMut::from(&reply[..]), "10.0.0.7:5000".parse().unwrap())),
                None => Err(TransportError::ReadTimeout { timeout }),
            }
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }

        fn is_bound(&self) -> bool {
            !self.closed.load(Ordering::SeqCst)
        }

        fn local_addr(&self) -> Option<SocketAddr> {
            None
        }
    }

    fn scripted(reply: Option<Vec<u8>>) -> (Lookup<ScriptedTransport>, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        let transport = ScriptedTransport {
            reply,
            closed: closed.clone(),
        };
        (Lookup::new(transport), closed)
    }

    #[test]
    fn test_client_defaults() {
        let client = DiscoveryClient::default();
        assert_eq!(client.timeout(), Duration::from_secs(5));
        assert_eq!(client.port_range(), &(49152..=65535));
        assert_eq!(client.discovery_port(), 5000);
        assert_eq!(client.byte_order(), AddressByteOrder::Native);
    }

    #[tokio::test]
    async fn test_lookup_releases_transport_on_success() {
        let (mut lookup, closed) = scripted(Some(vec![0x32, 0x01, 0xA8, 0xC0]));
        let target = "255.255.255.255:5000".parse().unwrap();

        let discovery = lookup
            .exchange(target, Duration::from_secs(1), AddressByteOrder::Little)
            .await
            .unwrap();
        assert_eq!(lookup.state, LookupState::AwaitingReply);

        lookup.finish(LookupState::Completed).unwrap();
        assert_eq!(lookup.state, LookupState::Completed);
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(discovery.controller.ip(), CONTROLLER);
    }

    #[tokio::test]
    async fn test_lookup_releases_transport_on_decode_error() {
        let (lookup, closed) = scripted(Some(vec![0x32, 0x01]));
        let target = "255.255.255.255:5000".parse().unwrap();

        let err = lookup
            .run(target, Duration::from_secs(1), AddressByteOrder::Native)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_lookup_releases_transport_on_timeout() {
        let (lookup, closed) = scripted(None);
        let target = "255.255.255.255:5000".parse().unwrap();

        let err = lookup
            .run(target, Duration::from_secs(1), AddressByteOrder::Native)
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_lookup_released_when_dropped() {
        let (lookup, closed) = scripted(None);
        drop(lookup);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_lookup_finds_controller() {
        let mut reply = vec![0x32, 0x01, 0xA8, 0xC0];
        reply.extend_from_slice(&[0xEE; 8]);
        let (port, responder) = spawn_responder(reply.clone(), 1).await;

        let client = DiscoveryClient::new()
            .with_discovery_port(port)
            .with_byte_order(AddressByteOrder::Little)
            .with_timeout(Duration::from_secs(1));

        let discovery = client.lookup_at(Ipv4Addr::LOCALHOST).await.unwrap();
        responder.await.unwrap();

        assert_eq!(discovery.controller.ip(), CONTROLLER);
        assert_eq!(discovery.raw, Bytes::from(reply));
        assert_eq!(discovery.peer, SocketAddr::from((Ipv4Addr::LOCALHOST, port)));
    }

    #[tokio::test]
    async fn test_lookup_native_byte_order() {
        let (port, responder) = spawn_responder(native_reply(CONTROLLER), 1).await;

        let client = DiscoveryClient::new()
            .with_discovery_port(port)
            .with_timeout(Duration::from_secs(1));

        let discovery = client.lookup_at(Ipv4Addr::LOCALHOST).await.unwrap();
        responder.await.unwrap();

        assert_eq!(discovery.controller, ControllerInfo::new(CONTROLLER));
        assert_eq!(discovery.controller.rest_url(), "http://192.168.1.50");
    }

    #[tokio::test]
    async fn test_lookup_timeout() {
        let (port, _silent) = silent_responder().await;
        let timeout = Duration::from_secs(1);

        let client = DiscoveryClient::new()
            .with_discovery_port(port)
            .with_timeout(timeout);

        let started = Instant::now();
        let err = client.lookup_at(Ipv4Addr::LOCALHOST).await.unwrap_err();
        let elapsed = started.elapsed();

        assert!(err.is_timeout());
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_lookup_short_reply() {
        let (port, responder) = spawn_responder(vec![0x32, 0x01], 1).await;

        let client = DiscoveryClient::new()
            .with_discovery_port(port)
            .with_timeout(Duration::from_secs(1));

        let err = client.lookup_at(Ipv4Addr::LOCALHOST).await.unwrap_err();
        responder.await.unwrap();

        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_lookup_invalid_port_range() {
        #[allow(clippy::reversed_empty_ranges)]
        let client = DiscoveryClient::new().with_port_range(60000..=50000);

        let err = client.lookup_at(Ipv4Addr::LOCALHOST).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Socket);
    }

    #[tokio::test]
    async fn test_lookup_local_port_taken() {
        let held = std::net::UdpSocket::bind("0.0.0.0:0").unwrap();
        let port = held.local_addr().unwrap().port();

        let client = DiscoveryClient::new().with_port_range(port..=port);

        let err = client.lookup_at(Ipv4Addr::LOCALHOST).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Socket);
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_concurrent_lookups() {
        const LOOKUPS: usize = 8;

        let (port, responder) = spawn_responder(native_reply(CONTROLLER), LOOKUPS).await;

        let client = DiscoveryClient::new()
            .with_discovery_port(port)
            .with_timeout(Duration::from_secs(2));

        let handles: Vec<_> = (0..LOOKUPS)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.lookup_at(Ipv4Addr::LOCALHOST).await })
            })
            .collect();

        for handle in handles {
            let discovery = handle.await.unwrap().unwrap();
            assert_eq!(discovery.controller.ip(), CONTROLLER);
        }

        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_sequential_lookups_release_sockets() {
        const LOOKUPS: usize = 200;

        let (port, responder) = spawn_responder(vec![0x01], LOOKUPS).await;

        let client = DiscoveryClient::new()
            .with_discovery_port(port)
            .with_timeout(Duration::from_secs(1));

        for _ in 0..LOOKUPS {
            let err = client.lookup_at(Ipv4Addr::LOCALHOST).await.unwrap_err();
            assert!(err.is_decode_error());
        }

        responder.await.unwrap();
    }

    // Requires a controller on the local network segment
    #[tokio::test]
    #[ignore]
    async fn test_lookup_broadcast() {
        let discovery = DiscoveryClient::new().lookup().await.unwrap();
        println!("{}", discovery);
    }
}
