//! The contract every action payload implements.

use serde::{Serialize, de::DeserializeOwned};

/// Field-level schema for one wire action.
///
/// The struct's serde shape defines required/optional fields and their
/// types; [`validate`](Self::validate) adds the constraints serde can't
/// express (lengths, formats, "one of these two").
pub trait ActionSchema: Serialize + DeserializeOwned + Send + 'static {
    /// The `action` value that selects this schema.
    const ACTION: &'static str;

    /// Whether the sending connection must already be authenticated.
    const REQUIRES_AUTH: bool = true;

    /// Checks constraints beyond the field types.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A payload paired with its `action` tag, ready to encode as one frame.
///
/// ```text
/// Framed::new(&DispatchCommand { .. })
///   → {"action":"dispatch-command","server":"lobby","commands":[..]}
/// ```
#[derive(Debug, Serialize)]
pub struct Framed<'a, S: ActionSchema> {
    action: &'static str,
    #[serde(flatten)]
    payload: &'a S,
}

impl<'a, S: ActionSchema> Framed<'a, S> {
    pub fn new(payload: &'a S) -> Self {
        Self {
            action: S::ACTION,
            payload,
        }
    }
}
