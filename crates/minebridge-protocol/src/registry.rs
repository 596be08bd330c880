//! Action registry: maps an action name to its schema and handler.
//!
//! A frame goes through three steps before a handler sees it:
//!
//! ```text
//! bytes ──decode──→ JSON object ──"action"──→ registration
//!       ──deserialize + validate──→ typed payload ──→ handler(ctx, payload)
//! ```
//!
//! [`ActionRegistry::prepare`] performs everything up to the typed payload
//! and hands back a [`PreparedAction`]; the caller decides whether to run
//! it (for example after checking that the connection is authenticated).
//!
//! The registry is generic over the handler context `C` and handler error
//! `E`, so it knows nothing about connections or bridge state.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::{ActionSchema, Codec, ProtocolError};

/// A decoded, validated payload bound to its handler, waiting for a context.
type Invocation<C, E> =
    Box<dyn FnOnce(C) -> BoxFuture<'static, Result<(), E>> + Send>;

/// Turns a raw JSON payload into an [`Invocation`], or rejects it.
type Builder<C, E> = Arc<
    dyn Fn(serde_json::Value) -> Result<Invocation<C, E>, ProtocolError>
        + Send
        + Sync,
>;

struct Registration<C, E> {
    requires_auth: bool,
    build: Builder<C, E>,
}

/// Maps action names to their (schema, handler) pairs.
///
/// Registration happens once at startup; afterwards the registry is only
/// read, so it can be shared behind an `Arc` without locking.
pub struct ActionRegistry<C, E> {
    actions: HashMap<String, Registration<C, E>>,
}

impl<C, E> ActionRegistry<C, E>
where
    C: Send + 'static,
    E: Send + 'static,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Registers `handler` for frames whose `action` equals `name`,
    /// validating payloads against schema `S`.
    ///
    /// Registering a name twice replaces the earlier handler and logs a
    /// warning; the last registration wins.
    pub fn register<S, F, Fut>(&mut self, name: &str, handler: F)
    where
        S: ActionSchema,
        F: Fn(C, S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let action = name.to_owned();
        let build: Builder<C, E> = Arc::new(move |value| {
            let payload: S = serde_json::from_value(value).map_err(|e| {
                ProtocolError::Validation {
                    action: action.clone(),
                    reason: e.to_string(),
                }
            })?;
            payload.validate().map_err(|reason| {
                ProtocolError::Validation {
                    action: action.clone(),
                    reason,
                }
            })?;
            let handler = Arc::clone(&handler);
            Ok(Box::new(move |ctx: C| handler(ctx, payload).boxed())
                as Invocation<C, E>)
        });

        let registration = Registration {
            requires_auth: S::REQUIRES_AUTH,
            build,
        };
        if self.actions.insert(name.to_owned(), registration).is_some() {
            tracing::warn!(action = name, "overriding existing action handler");
        } else {
            tracing::debug!(action = name, "action handler registered");
        }
    }

    /// Decodes a frame, looks up its action, and validates the payload.
    ///
    /// # Errors
    /// - [`ProtocolError::Decode`]: the frame is not JSON
    /// - [`ProtocolError::MissingAction`]: no string `action` field
    /// - [`ProtocolError::UnknownAction`]: nothing registered under it
    /// - [`ProtocolError::Validation`]: the payload failed its schema
    pub fn prepare(
        &self,
        codec: &impl Codec,
        frame: &[u8],
    ) -> Result<PreparedAction<C, E>, ProtocolError> {
        let value: serde_json::Value = codec.decode(frame)?;
        let action = value
            .get("action")
            .and_then(serde_json::Value::as_str)
            .ok_or(ProtocolError::MissingAction)?
            .to_owned();
        let registration = self
            .actions
            .get(&action)
            .ok_or_else(|| ProtocolError::UnknownAction(action.clone()))?;
        let invocation = (registration.build)(value)?;

        Ok(PreparedAction {
            action,
            requires_auth: registration.requires_auth,
            invocation,
        })
    }

    /// Returns `true` if a handler is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<C, E> Default for ActionRegistry<C, E>
where
    C: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A frame that passed decoding and schema validation.
pub struct PreparedAction<C, E> {
    action: String,
    requires_auth: bool,
    invocation: Invocation<C, E>,
}

impl<C, E> PreparedAction<C, E> {
    /// The action name from the frame.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Whether the schema only accepts authenticated senders.
    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    /// Runs the handler with the given context.
    pub async fn run(self, ctx: C) -> Result<(), E> {
        (self.invocation)(ctx).await
    }
}
