//! The authenticated client table.
//!
//! One entry per connection that passed `authenticate`, keyed by the
//! connection's id. The entry holds a handle for sending to that
//! connection and the server names it declared. Entries are removed when
//! the connection closes, so the table never outlives its sockets.
//!
//! `ClientTable` is generic over the handle type `H` (typically an
//! `Arc` of the transport connection) and does no locking of its own.

use std::collections::HashMap;
use std::time::Instant;

use minebridge_transport::ConnectionId;

use crate::SessionError;

/// One authenticated game-server connection.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient<H> {
    /// Handle used to send frames to this connection.
    pub handle: H,
    /// Logical servers this connection declared it hosts.
    pub server_list: Vec<String>,
    /// When the latest successful `authenticate` arrived.
    pub authenticated_at: Instant,
}

impl<H> AuthenticatedClient<H> {
    /// Returns `true` if this connection declared `server`.
    pub fn hosts(&self, server: &str) -> bool {
        self.server_list.iter().any(|s| s == server)
    }
}

/// Connection id → authenticated client.
#[derive(Debug)]
pub struct ClientTable<H> {
    clients: HashMap<ConnectionId, AuthenticatedClient<H>>,
}

impl<H: Clone> ClientTable<H> {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Binds `server_list` to connection `id`.
    ///
    /// Re-authentication on the same connection replaces the earlier
    /// binding; the previous entry is returned.
    pub fn bind(
        &mut self,
        id: ConnectionId,
        handle: H,
        server_list: Vec<String>,
    ) -> Option<AuthenticatedClient<H>> {
        let client = AuthenticatedClient {
            handle,
            server_list,
            authenticated_at: Instant::now(),
        };
        let previous = self.clients.insert(id, client);
        if previous.is_some() {
            tracing::debug!(%id, "re-authentication replaced binding");
        }
        previous
    }

    /// Removes the entry for a closed connection.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if the connection never
    /// authenticated (or was already removed).
    pub fn remove(
        &mut self,
        id: ConnectionId,
    ) -> Result<AuthenticatedClient<H>, SessionError> {
        self.clients.remove(&id).ok_or(SessionError::NotFound(id))
    }

    pub fn get(&self, id: ConnectionId) -> Option<&AuthenticatedClient<H>> {
        self.clients.get(&id)
    }

    pub fn is_authenticated(&self, id: ConnectionId) -> bool {
        self.clients.contains_key(&id)
    }

    /// Handles for every authenticated connection.
    pub fn handles(&self) -> Vec<H> {
        self.clients.values().map(|c| c.handle.clone()).collect()
    }

    /// Handles for the connections that declared `server`.
    pub fn hosts_of(&self, server: &str) -> Vec<H> {
        self.clients
            .values()
            .filter(|c| c.hosts(server))
            .map(|c| c.handle.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl<H: Clone> Default for ClientTable<H> {
    fn default() -> Self {
        Self::new()
    }
}
