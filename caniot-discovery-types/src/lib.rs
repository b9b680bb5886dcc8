//! Type definitions for caniot-discovery

pub mod controller;
pub mod discovery;

pub use controller::ControllerInfo;
pub use discovery::Discovery;
