//! Transport errors

use std::io;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Socket not bound")]
    NotBound,

    #[error("No reply within {timeout:?}")]
    ReadTimeout { timeout: Duration },

    #[error("No free local port after {attempts} attempts")]
    PortUnavailable { attempts: usize },

    #[error("Invalid local port range: {start}..={end}")]
    InvalidPortRange { start: u16, end: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
