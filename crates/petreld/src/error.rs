//! Error types for the Petrel daemon.

use std::net::SocketAddr;
use thiserror::Error;

/// Errors that can occur while running the daemon.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Feed connection or stream failure.
    #[error("feed error: {0}")]
    Feed(String),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] petrel_proto::ProtoError),

    /// Health listener failed to bind its address.
    #[error("failed to bind {0}: {1}")]
    BindFailed(SocketAddr, #[source] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
