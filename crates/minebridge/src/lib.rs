//! # Minebridge
//!
//! Real-time bridge between a community bot and the game-server processes
//! of one network.
//!
//! Game servers connect over WebSocket, authenticate with a shared secret,
//! and declare the logical servers they host. The bot then uses a
//! [`Bridge`] to ask whether a player is online and where, to message
//! players, servers, or everyone, and to run console commands on a server.
//! Answers to questions arrive as ordinary reports that fill short-lived
//! caches; the bridge waits a fixed time and reads the cache.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minebridge::prelude::*;
//!
//! # async fn run() -> Result<(), BridgeError> {
//! let server = BridgeServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .password("change-me-please")
//!     .build()
//!     .await?;
//!
//! let bridge = server.bridge();
//! tokio::spawn(async move {
//!     let steve = PlayerRef::Username("Steve".into());
//!     if bridge.check_presence(&steve).await {
//!         bridge
//!             .send_player_message(&steve, MessageType::Info, "Welcome back!")
//!             .await;
//!     }
//! });
//!
//! server
//!     .run_until(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! # }
//! ```

mod actions;
mod bridge;
pub mod config;
mod error;
mod listener;
mod presence;
pub mod rewards;
mod server;
mod state;

pub use actions::AUTH_FAILED_REASON;
pub use bridge::Bridge;
pub use config::{AuthConfig, BridgeConfig, ConfigError};
pub use error::BridgeError;
pub use rewards::{MemoryRewardStore, RewardRecord, RewardStore};
pub use server::{BridgeServer, BridgeServerBuilder, ShutdownHandle};

pub use minebridge_protocol::{Commands, MessageType, PlayerRef};

/// Installs a `tracing` subscriber that writes to stderr.
///
/// Filtering follows `RUST_LOG`, falling back to `info` for everything.
/// Calling it twice is harmless; the second call does nothing.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub mod prelude {
    pub use crate::{
        Bridge, BridgeConfig, BridgeError, BridgeServer, BridgeServerBuilder,
        Commands, MemoryRewardStore, MessageType, PlayerRef, RewardRecord,
        RewardStore, ShutdownHandle,
    };
}
