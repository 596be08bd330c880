//! Error types for the protocol layer.
//!
//! Every variant here is a "protocol error" in the bridge's taxonomy:
//! the offending frame is logged and dropped, and the connection that
//! sent it stays open.

/// Errors that can occur while encoding, decoding, or routing a frame.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The frame is not valid JSON.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame is a JSON value but has no string `action` field.
    #[error("frame has no action field")]
    MissingAction,

    /// No handler is registered under this action name.
    #[error("no handler registered for action {0:?}")]
    UnknownAction(String),

    /// The payload does not match the action's schema: a missing field,
    /// a wrong type, or a failed constraint.
    #[error("invalid {action} payload: {reason}")]
    Validation {
        /// The action whose schema rejected the payload.
        action: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The message is invalid at the protocol level for any other reason.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
