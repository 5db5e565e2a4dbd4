//! Error types for the fieldtest environment contracts.

use thiserror::Error;

/// Errors that can occur at the transport or display boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    /// Tick or world channel was closed by the other side
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    /// A snapshot arrived for the wrong tick (skipped or duplicated)
    #[error("Out-of-order world snapshot: expected tick {expected}, received tick {received}")]
    OutOfOrder { expected: u64, received: u64 },

    /// The display failed to start or render
    #[error("Display error: {0}")]
    DisplayError(String),
}

impl EnvError {
    /// Creates a channel-closed error.
    pub fn closed(msg: impl Into<String>) -> Self {
        Self::ChannelClosed(msg.into())
    }

    /// Creates a display error.
    pub fn display(err: impl std::fmt::Display) -> Self {
        Self::DisplayError(err.to_string())
    }
}
