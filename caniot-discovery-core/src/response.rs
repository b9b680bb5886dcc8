//! Discovery reply decoding

use std::fmt;
use std::net::Ipv4Addr;

use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};
use bytes::Bytes;
use tracing::trace;

use crate::{
    constants::ADDRESS_SIZE,
    error::{Error, Result},
};

/// Byte order of the 32-bit address at the start of a reply
///
/// Controllers write the address as a raw host integer rather than in
/// network order, so the default is the order of the machine running the
/// client. Pin `Little` or `Big` when talking to a controller of known
/// endianness from a host of a different one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressByteOrder {
    /// Byte order of the local host
    #[default]
    Native,

    /// Least significant byte first
    Little,

    /// Most significant byte first
    Big,
}

impl AddressByteOrder {
    fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Self::Native => NativeEndian::read_u32(buf),
            Self::Little => LittleEndian::read_u32(buf),
            Self::Big => BigEndian::read_u32(buf),
        }
    }
}

/// Reply sent by a controller to a search request
///
/// # Layout
///
/// ```text
/// ┌──────────────────────┬───────────────────────────┐
/// │       Address        │         Reserved          │
/// │  4 bytes (host u32)  │  0..28 bytes (preserved)  │
/// └──────────────────────┴───────────────────────────┘
/// ```
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use caniot_discovery_core::{AddressByteOrder, DiscoveryResponse};
///
/// let raw = vec![0x32, 0x01, 0xA8, 0xC0, 0x00, 0x00];
/// let response = DiscoveryResponse::decode(raw, AddressByteOrder::Little).unwrap();
///
/// assert_eq!(response.address(), Ipv4Addr::new(192, 168, 1, 50));
/// assert_eq!(response.reserved().len(), 2);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct DiscoveryResponse {
    address: Ipv4Addr,
    raw: Bytes,
}

impl DiscoveryResponse {
    /// Decode a reply
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResponseTooShort`] if the buffer holds fewer than
    /// [`ADDRESS_SIZE`] bytes.
    pub fn decode(raw: impl Into<Bytes>, order: AddressByteOrder) -> Result<Self> {
        let raw = raw.into();

        if raw.len() < ADDRESS_SIZE {
            return Err(Error::ResponseTooShort {
                expected: ADDRESS_SIZE,
                actual: raw.len(),
            });
        }

        let address = Ipv4Addr::from(order.read_u32(&raw[..ADDRESS_SIZE]));

        trace!(
            "Decoded address {} from {} ({:?})",
            address,
            hex::encode(&raw),
            order
        );

        Ok(Self { address, raw })
    }

    /// Address advertised by the controller
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Complete reply as received
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Bytes following the address field
    pub fn reserved(&self) -> &[u8] {
        &self.raw[ADDRESS_SIZE..]
    }

    /// Consume the response, returning the raw bytes
    pub fn into_raw(self) -> Bytes {
        self.raw
    }
}

impl fmt::Debug for DiscoveryResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryResponse")
            .field("address", &self.address)
            .field("raw", &hex::encode(&self.raw))
            .finish()
    }
}

impl fmt::Display for DiscoveryResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiscoveryResponse[{}](len={})", self.address, self.raw.len())
    }
}
