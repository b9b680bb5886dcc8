//! Lookup state machine
//!
//! A lookup moves through:
//! - `Idle`: no socket allocated
//! - `AwaitingReply`: socket bound, probe sent, waiting for a datagram
//! - `Completed` / `Failed`: terminal, the socket has been released

use crate::error::{Error, Result};

/// State of a single discovery exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupState {
    /// No socket allocated yet
    #[default]
    Idle,

    /// Probe sent, waiting for a reply
    AwaitingReply,

    /// Reply received and decoded
    Completed,

    /// Timeout, decode or socket failure
    Failed,
}

impl LookupState {
    /// Check if this state ends the exchange
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Validate and perform a transition to `to`
    ///
    /// `Failed` is reachable from any non-terminal state, `Completed`
    /// only from `AwaitingReply`.
    pub fn transition(self, to: LookupState) -> Result<LookupState> {
        let allowed = match (self, to) {
            (Self::Idle, Self::AwaitingReply) => true,
            (Self::AwaitingReply, Self::Completed) => true,
            (Self::Idle | Self::AwaitingReply, Self::Failed) => true,
            _ => false,
        };

        if allowed {
            Ok(to)
        } else {
            Err(Error::InvalidTransition { from: self, to })
        }
    }
}
