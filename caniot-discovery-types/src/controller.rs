//! Discovered controller information

use std::fmt;
use std::net::Ipv4Addr;

/// Parsed content of a controller's discovery reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerInfo {
    ip: Ipv4Addr,
}

impl ControllerInfo {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self { ip }
    }

    /// Address the controller advertises for itself
    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    /// Base URL of the REST server exposed by the controller
    pub fn rest_url(&self) -> String {
        format!("http://{}", self.ip)
    }
}

impl From<Ipv4Addr> for ControllerInfo {
    fn from(ip: Ipv4Addr) -> Self {
        Self::new(ip)
    }
}

impl fmt::Display for ControllerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Controller[ip: {}]", self.ip)
    }
}
