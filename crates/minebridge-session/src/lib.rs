//! Game-server sessions for Minebridge.
//!
//! This crate tracks which connections have proved they belong to the
//! trusted game-server fleet:
//!
//! 1. **Authentication**: checking the shared secret ([`Authenticator`],
//!    [`SharedSecret`])
//! 2. **Client table**: connection id → bound server names
//!    ([`ClientTable`])
//! 3. **Known servers**: every server name ever accepted
//!    ([`KnownServers`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Bridge (above)    ← routes facade traffic using the client table
//!     ↕
//! Session (this crate)
//!     ↕
//! Transport (below) ← provides ConnectionId
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod clients;
mod error;
mod servers;

pub use auth::{Authenticator, SharedSecret};
pub use clients::{AuthenticatedClient, ClientTable};
pub use error::SessionError;
pub use servers::KnownServers;
