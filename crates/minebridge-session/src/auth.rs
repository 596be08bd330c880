//! Authentication hook for game-server connections.
//!
//! The bridge runs on a trusted private network, so one shared secret
//! admits every game-server process. The [`Authenticator`] trait keeps
//! the check swappable (tests use mocks; a deployment could call out to
//! a secrets service) without touching the listener.

use crate::SessionError;

/// Validates the secret a game server presents in `authenticate`.
///
/// # Example
///
/// ```rust
/// use minebridge_session::{Authenticator, SessionError};
///
/// /// Admits everyone. Only for local experiments.
/// struct OpenDoor;
///
/// impl Authenticator for OpenDoor {
///     async fn authenticate(&self, _password: &str) -> Result<(), SessionError> {
///         Ok(())
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Returns `Ok(())` if `password` grants access.
    fn authenticate(
        &self,
        password: &str,
    ) -> impl std::future::Future<Output = Result<(), SessionError>> + Send;
}

/// The single shared secret configured for the bridge.
#[derive(Clone)]
pub struct SharedSecret {
    secret: String,
}

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Compares without short-circuiting on the first differing byte.
    fn matches(&self, candidate: &str) -> bool {
        let expected = self.secret.as_bytes();
        let given = candidate.as_bytes();
        if expected.len() != given.len() {
            return false;
        }
        expected
            .iter()
            .zip(given)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

// Never print the secret.
impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret").finish_non_exhaustive()
    }
}

impl Authenticator for SharedSecret {
    async fn authenticate(&self, password: &str) -> Result<(), SessionError> {
        if self.matches(password) {
            Ok(())
        } else {
            Err(SessionError::AuthFailed("invalid credentials".into()))
        }
    }
}
