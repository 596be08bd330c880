//! Transport abstraction layer for Minebridge.
//!
//! Provides the [`Transport`] and [`Connection`] traits that the bridge
//! listener is written against, plus the WebSocket implementation game
//! servers connect through.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{PendingWebSocket, WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Opaque identifier for a connection.
///
/// Stands in for "the socket handle's identity": unique for the lifetime
/// of the process, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Close codes the bridge sends when it ends a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseCode {
    /// 1000: the exchange is finished.
    Normal,
    /// 1001: the server is shutting down or the peer went silent.
    GoingAway,
    /// 1008: the peer broke a policy, e.g. sent a bad secret.
    PolicyViolation,
}

impl CloseCode {
    /// The numeric code carried in the close frame.
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Normal => 1000,
            Self::GoingAway => 1001,
            Self::PolicyViolation => 1008,
        }
    }
}

/// Accepts new incoming connections.
///
/// Accepting is split in two so the accept loop never waits on a peer:
/// [`accept`](Self::accept) only takes the raw socket, and the protocol
/// upgrade runs later through [`Handshake::complete`], typically on the
/// connection's own task.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// An accepted socket that hasn't finished its upgrade.
    type Pending: Handshake<Connection = Self::Connection, Error = Self::Error>;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next incoming socket.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;

    /// Gracefully shuts down the transport, stopping new connections.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// The second half of accepting: upgrading a raw socket to a connection.
pub trait Handshake: Send + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// The remote socket address.
    fn peer_addr(&self) -> SocketAddr;

    /// Runs the upgrade. Implementations bound how long it may take.
    async fn complete(self) -> Result<Self::Connection, Self::Error>;
}

/// A single bidirectional connection carrying UTF-8 text frames.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one text frame to the remote peer.
    async fn send(&self, text: &str) -> Result<(), Self::Error>;

    /// Receives the next data frame from the remote peer.
    ///
    /// Control frames (ping/pong) are consumed internally but still count
    /// as activity for [`idle_for`](Self::idle_for).
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Sends a keep-alive ping.
    async fn ping(&self) -> Result<(), Self::Error>;

    /// Starts the closing handshake with the given code and reason.
    async fn close(
        &self,
        code: CloseCode,
        reason: &str,
    ) -> Result<(), Self::Error>;

    /// Time since the last frame of any kind arrived from the peer.
    fn idle_for(&self) -> Duration;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
