//! Error types for the session layer.

use minebridge_transport::ConnectionId;

/// Errors that can occur during game-server session handling.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The presented secret was rejected.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// No authenticated client is bound to this connection.
    #[error("no authenticated client for {0}")]
    NotFound(ConnectionId),
}
