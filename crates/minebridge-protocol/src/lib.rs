//! Wire protocol for Minebridge.
//!
//! This crate defines what the bridge and game servers say to each other:
//!
//! - **Actions** ([`Authenticate`], [`PlayerStatusCheck`], ...): one
//!   schema per `action` value, each implementing [`ActionSchema`].
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): frames are UTF-8 JSON
//!   objects, one per WebSocket message.
//! - **Registry** ([`ActionRegistry`]): routes a decoded frame to the
//!   handler registered for its action after validating the payload.
//! - **Errors** ([`ProtocolError`]): everything that makes a frame
//!   unusable. None of them is fatal to a connection.
//!
//! There is no correlation id on the wire: queries and reports meet only
//! through the player key and the fact type (`status` or `server`).

mod actions;
mod codec;
mod error;
mod registry;
mod schema;
mod types;

pub use actions::{
    AUTHENTICATE, Authenticate, DISPATCH_COMMAND, DispatchCommand,
    PLAYER_SERVER_CHECK, PLAYER_STATUS_CHECK, PlayerServerCheck,
    PlayerStatusCheck, SEND_GLOBAL_MESSAGE, SEND_PLAYER_MESSAGE,
    SEND_SERVER_MESSAGE, SendGlobalMessage, SendPlayerMessage,
    SendServerMessage,
};
pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use registry::{ActionRegistry, PreparedAction};
pub use schema::{ActionSchema, Framed};
pub use types::{
    AuthReply, Commands, MAX_USERNAME_LEN, MessageType, PlayerRef,
    check_not_blank, check_player_fields, check_username, check_uuid,
};
