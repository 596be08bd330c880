//! Unified error type for the bridge.

use minebridge_protocol::ProtocolError;
use minebridge_session::SessionError;
use minebridge_transport::TransportError;

use crate::config::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` variants let `?` lift sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, schema validation).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (bad secret, unknown connection).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The settings could not be loaded or are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The named server is not in the known-server set.
    #[error("server {0:?} not found in available servers")]
    UnknownServer(String),

    /// The reward store failed to load or persist a record.
    #[error("reward store error: {0}")]
    RewardStore(#[source] Box<dyn std::error::Error + Send + Sync>),
}
