//! Error types for caniot-discovery-core

/// Result type alias for discovery protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Protocol-level errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Reply is too short to carry an address
    #[error("Discovery response too short: expected at least {expected} bytes, got {actual} bytes")]
    ResponseTooShort {
        expected: usize,
        actual: usize,
    },

    /// Illegal lookup state transition
    #[error("Invalid lookup state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: crate::state::LookupState,
        to: crate::state::LookupState,
    },
}
