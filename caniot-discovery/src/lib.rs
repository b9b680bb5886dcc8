//! # caniot-discovery
//!
//! Locate a caniot controller on the local network.
//!
//! The client broadcasts a fixed search request on UDP port 5000 and
//! decodes the controller's address from the first reply.
//!
//! ## Quick Start
//!
//! ```no_run
//! use caniot_discovery::DiscoveryClient;
//!
//! #[tokio::main]
//! async fn main() -> caniot_discovery::Result<()> {
//!     let client = DiscoveryClient::new();
//!
//!     let discovery = client.lookup().await?;
//!     println!("{}", discovery);
//!     println!("REST server {}", discovery.controller.rest_url());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;

// Re-exports
pub use client::DiscoveryClient;
pub use error::{Error, ErrorKind, Result};

// Re-export types
pub use caniot_discovery_core::AddressByteOrder;
pub use caniot_discovery_types::{ControllerInfo, Discovery};
