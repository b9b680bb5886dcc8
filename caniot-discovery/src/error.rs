//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] caniot_discovery_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] caniot_discovery_transport::Error),
}

/// Failure classes surfaced by a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No reply within the configured window
    Timeout,

    /// A reply arrived but could not be decoded
    Decode,

    /// Local socket failure
    Socket,
}

impl Error {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        use caniot_discovery_core::Error as Core;
        use caniot_discovery_transport::Error as Transport;

        match self {
            Self::Core(Core::ResponseTooShort { .. }) => ErrorKind::Decode,
            Self::Core(Core::InvalidTransition { .. }) => ErrorKind::Socket,
            Self::Transport(Transport::ReadTimeout { .. }) => ErrorKind::Timeout,
            Self::Transport(_) => ErrorKind::Socket,
        }
    }

    /// No controller answered in time
    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    /// A controller answered with a malformed reply
    pub fn is_decode_error(&self) -> bool {
        self.kind() == ErrorKind::Decode
    }

    /// Check if a fresh lookup might succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Timeout | ErrorKind::Decode)
    }
}
