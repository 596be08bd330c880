//! Payload schemas for every action the bridge sends or receives.
//!
//! | Action | Direction |
//! |---|---|
//! | `authenticate` | server → bridge |
//! | `player-status-check` | both |
//! | `player-server-check` | both |
//! | `send-player-message` | bridge → server |
//! | `send-server-message` | bridge → server |
//! | `send-global-message` | bridge → server |
//! | `dispatch-command` | bridge → server |

use serde::{Deserialize, Serialize};

use crate::types::{check_not_blank, check_player_fields};
use crate::{ActionSchema, Commands, MessageType};

pub const AUTHENTICATE: &str = "authenticate";
pub const PLAYER_STATUS_CHECK: &str = "player-status-check";
pub const PLAYER_SERVER_CHECK: &str = "player-server-check";
pub const SEND_PLAYER_MESSAGE: &str = "send-player-message";
pub const SEND_SERVER_MESSAGE: &str = "send-server-message";
pub const SEND_GLOBAL_MESSAGE: &str = "send-global-message";
pub const DISPATCH_COMMAND: &str = "dispatch-command";

/// A game-server process proving it knows the shared secret and naming
/// the logical servers it hosts (a proxy may host several).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authenticate {
    pub password: String,
    pub server_list: Vec<String>,
}

impl ActionSchema for Authenticate {
    const ACTION: &'static str = AUTHENTICATE;
    const REQUIRES_AUTH: bool = false;

    fn validate(&self) -> Result<(), String> {
        check_not_blank("password", &self.password)?;
        if self.server_list.is_empty() {
            return Err("server_list must name at least one server".into());
        }
        for server in &self.server_list {
            check_not_blank("server_list entry", server)?;
        }
        Ok(())
    }
}

/// Presence query (bridge → server, `online` unset) or presence report
/// (server → bridge, `online` set).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatusCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
}

impl ActionSchema for PlayerStatusCheck {
    const ACTION: &'static str = PLAYER_STATUS_CHECK;

    fn validate(&self) -> Result<(), String> {
        check_player_fields(self.username.as_deref(), self.uuid.as_deref())
    }
}

/// Location query (bridge → server) or location report (server → bridge).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerServerCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
}

impl ActionSchema for PlayerServerCheck {
    const ACTION: &'static str = PLAYER_SERVER_CHECK;

    fn validate(&self) -> Result<(), String> {
        check_player_fields(self.username.as_deref(), self.uuid.as_deref())?;
        if let Some(server) = &self.server {
            check_not_blank("server", server)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPlayerMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub message_type: MessageType,
    pub message: String,
}

impl ActionSchema for SendPlayerMessage {
    const ACTION: &'static str = SEND_PLAYER_MESSAGE;

    fn validate(&self) -> Result<(), String> {
        check_player_fields(self.username.as_deref(), self.uuid.as_deref())?;
        check_not_blank("message", &self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendServerMessage {
    pub server: String,
    pub message_type: MessageType,
    pub message: String,
}

impl ActionSchema for SendServerMessage {
    const ACTION: &'static str = SEND_SERVER_MESSAGE;

    fn validate(&self) -> Result<(), String> {
        check_not_blank("server", &self.server)?;
        check_not_blank("message", &self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendGlobalMessage {
    pub message_type: MessageType,
    pub message: String,
}

impl ActionSchema for SendGlobalMessage {
    const ACTION: &'static str = SEND_GLOBAL_MESSAGE;

    fn validate(&self) -> Result<(), String> {
        check_not_blank("message", &self.message)
    }
}

/// Raw console commands for one server, executed in list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchCommand {
    pub server: String,
    pub commands: Commands,
}

impl ActionSchema for DispatchCommand {
    const ACTION: &'static str = DISPATCH_COMMAND;

    fn validate(&self) -> Result<(), String> {
        check_not_blank("server", &self.server)?;
        if self.commands.is_empty() {
            return Err("commands must not be empty".into());
        }
        for cmd in self.commands.iter() {
            check_not_blank("command", cmd)?;
        }
        Ok(())
    }
}
