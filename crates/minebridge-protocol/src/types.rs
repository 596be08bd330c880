//! Value types shared by several actions.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MessageType
// ---------------------------------------------------------------------------

/// How a game server should style a chat message it displays.
///
/// Serialized in SCREAMING_SNAKE_CASE (`"INFO"`, `"NO_PREFIX"`), which is
/// what the game-side plugin matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Info,
    Success,
    Warn,
    Error,
    Question,
    Announce,
    /// Raw text with no prefix decoration.
    NoPrefix,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// One or more console commands for a game server.
///
/// On the wire this is either a bare string or a list of strings; the
/// untagged representation keeps whichever form the caller chose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Commands {
    One(String),
    Many(Vec<String>),
}

impl Commands {
    /// Iterates the commands in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(cmd) => std::slice::from_ref(cmd),
            Self::Many(cmds) => cmds,
        };
        slice.iter().map(String::as_str)
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(cmds) => cmds.len(),
        }
    }

    /// `true` for an empty list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for Commands {
    fn from(cmd: &str) -> Self {
        Self::One(cmd.to_owned())
    }
}

impl From<String> for Commands {
    fn from(cmd: String) -> Self {
        Self::One(cmd)
    }
}

impl From<Vec<String>> for Commands {
    fn from(cmds: Vec<String>) -> Self {
        Self::Many(cmds)
    }
}

impl From<&[&str]> for Commands {
    fn from(cmds: &[&str]) -> Self {
        Self::Many(cmds.iter().map(|c| (*c).to_owned()).collect())
    }
}

// ---------------------------------------------------------------------------
// PlayerRef
// ---------------------------------------------------------------------------

/// Identifies a player by exactly one key: their name or their UUID.
///
/// Wire schemas carry `username` and `uuid` as two optional fields. This
/// enum is how callers pick one, so "both" and "neither" can't happen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlayerRef {
    Username(String),
    Uuid(String),
}

impl PlayerRef {
    /// The cache key for this player.
    pub fn key(&self) -> &str {
        match self {
            Self::Username(name) => name,
            Self::Uuid(uuid) => uuid,
        }
    }

    /// Splits into the `(username, uuid)` field pair used on the wire.
    pub fn to_fields(&self) -> (Option<String>, Option<String>) {
        match self {
            Self::Username(name) => (Some(name.clone()), None),
            Self::Uuid(uuid) => (None, Some(uuid.clone())),
        }
    }
}

impl fmt::Display for PlayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(name) => write!(f, "{name}"),
            Self::Uuid(uuid) => write!(f, "uuid:{uuid}"),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthReply
// ---------------------------------------------------------------------------

/// Acknowledgement sent back after a successful `authenticate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthReply {
    pub status: String,
    pub message: String,
}

impl AuthReply {
    pub fn success() -> Self {
        Self {
            status: "success".into(),
            message: "Authentication successful".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Field constraints
// ---------------------------------------------------------------------------

/// Longest name a player account can have.
pub const MAX_USERNAME_LEN: usize = 16;

/// Player names are 1–16 characters of ASCII letters, digits, and `_`.
pub fn check_username(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > MAX_USERNAME_LEN {
        return Err(format!(
            "username must be 1-{MAX_USERNAME_LEN} characters, got {}",
            name.len()
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("username {name:?} has invalid characters"));
    }
    Ok(())
}

/// UUIDs are 32 hex digits, either bare or dashed as 8-4-4-4-12.
pub fn check_uuid(uuid: &str) -> Result<(), String> {
    let hex_only = |s: &str| s.chars().all(|c| c.is_ascii_hexdigit());
    let valid = match uuid.len() {
        32 => hex_only(uuid),
        36 => {
            let groups: Vec<&str> = uuid.split('-').collect();
            groups.len() == 5
                && groups
                    .iter()
                    .map(|g| g.len())
                    .eq([8usize, 4, 4, 4, 12])
                && groups.iter().all(|g| hex_only(g))
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(format!("uuid {uuid:?} is not a valid UUID"))
    }
}

/// At least one of the two player keys must be present, and each present
/// key must be well-formed.
pub fn check_player_fields(
    username: Option<&str>,
    uuid: Option<&str>,
) -> Result<(), String> {
    if username.is_none() && uuid.is_none() {
        return Err("one of username or uuid is required".into());
    }
    if let Some(name) = username {
        check_username(name)?;
    }
    if let Some(uuid) = uuid {
        check_uuid(uuid)?;
    }
    Ok(())
}

/// Rejects empty or whitespace-only text.
pub fn check_not_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}
