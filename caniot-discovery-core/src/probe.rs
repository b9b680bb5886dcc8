//! Search request sent to elicit a controller reply

use bytes::Bytes;

use crate::constants::SEARCH_REQUEST;

/// Discovery probe
///
/// The probe carries no header and no length prefix: the datagram
/// payload is exactly [`SEARCH_REQUEST`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Probe;

impl Probe {
    /// Encode probe to bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use caniot_discovery_core::Probe;
    ///
    /// let bytes = Probe.encode();
    /// assert_eq!(&bytes[..], b"Search caniot-controller");
    /// ```
    pub fn encode(&self) -> Bytes {
        Bytes::from_static(SEARCH_REQUEST)
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        SEARCH_REQUEST.len()
    }

    pub fn is_empty(&self) -> bool {
        SEARCH_REQUEST.is_empty()
    }
}
