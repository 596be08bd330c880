//! State shared by every connection task and the facade.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use minebridge_protocol::{ActionSchema, Codec, Framed, JsonCodec, ProtocolError};
use minebridge_session::{ClientTable, KnownServers};
use minebridge_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::Mutex;

use crate::config::BridgeConfig;
use crate::presence::PresenceCache;

/// Handle stored in the client table for sending to a connection.
pub(crate) type ClientHandle = Arc<WebSocketConnection>;

/// Each structure sits behind its own lock. No lock is held while a frame
/// is on the wire: senders copy the handles out first.
///
/// Fan-out sends run concurrently and each is bounded by the close
/// timeout. A peer that stops reading is dropped from the client table
/// the first time a send to it times out, so one stalled game server
/// can't hold up the facade.
pub(crate) struct BridgeState {
    pub(crate) clients: Mutex<ClientTable<ClientHandle>>,
    pub(crate) servers: Mutex<KnownServers>,
    pub(crate) presence: Mutex<PresenceCache>,
    pub(crate) codec: JsonCodec,
    pub(crate) config: BridgeConfig,
}

impl BridgeState {
    pub(crate) fn new(config: BridgeConfig) -> Self {
        Self {
            clients: Mutex::new(ClientTable::new()),
            servers: Mutex::new(KnownServers::new()),
            presence: Mutex::new(PresenceCache::new(config.cache_ttl())),
            codec: JsonCodec,
            config,
        }
    }

    pub(crate) async fn is_authenticated(&self, id: ConnectionId) -> bool {
        self.clients.lock().await.is_authenticated(id)
    }

    /// Validates `payload` and encodes it as a framed text message.
    pub(crate) fn frame<S: ActionSchema>(
        &self,
        payload: &S,
    ) -> Result<String, ProtocolError> {
        payload
            .validate()
            .map_err(|reason| ProtocolError::Validation {
                action: S::ACTION.to_owned(),
                reason,
            })?;
        self.codec.encode_text(&Framed::new(payload))
    }

    /// Sends `text` to every authenticated connection. Returns how many
    /// sends succeeded.
    pub(crate) async fn broadcast(&self, text: &str) -> usize {
        let targets = self.clients.lock().await.handles();
        self.send_all(&targets, text).await
    }

    /// Sends `text` to each connection that declared `server`. Returns how
    /// many sends succeeded.
    pub(crate) async fn send_to_hosts(&self, server: &str, text: &str) -> usize {
        let targets = self.clients.lock().await.hosts_of(server);
        self.send_all(&targets, text).await
    }

    async fn send_all(&self, targets: &[ClientHandle], text: &str) -> usize {
        let limit = self.config.close_timeout();
        let outcomes =
            join_all(targets.iter().map(|conn| send_bounded(conn, text, limit)))
                .await;

        let mut delivered = 0;
        for (conn, outcome) in targets.iter().zip(outcomes) {
            match outcome {
                SendOutcome::Sent => delivered += 1,
                SendOutcome::Failed => {}
                SendOutcome::Stalled => self.evict(conn.id()).await,
            }
        }
        delivered
    }

    /// Forgets a connection whose peer stopped reading. Its task notices
    /// on the next frame or ping and closes the socket.
    async fn evict(&self, id: ConnectionId) {
        if self.clients.lock().await.remove(id).is_ok() {
            tracing::warn!(conn_id = %id, "peer stopped reading, evicted");
        }
    }
}

enum SendOutcome {
    Sent,
    Failed,
    Stalled,
}

async fn send_bounded(
    conn: &ClientHandle,
    text: &str,
    limit: Duration,
) -> SendOutcome {
    match tokio::time::timeout(limit, conn.send(text)).await {
        Ok(Ok(())) => SendOutcome::Sent,
        Ok(Err(e)) => {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed");
            SendOutcome::Failed
        }
        Err(_) => {
            tracing::warn!(conn_id = %conn.id(), ?limit, "send timed out");
            SendOutcome::Stalled
        }
    }
}
