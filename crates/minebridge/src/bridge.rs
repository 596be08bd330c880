//! The facade the community bot calls.
//!
//! Queries about players follow one pattern: answer from the cache if
//! possible; otherwise broadcast a question to every authenticated game
//! server, wait the full response timeout, and read the cache again. Replies
//! arrive as ordinary inbound reports and are never matched to the query
//! that caused them.

use std::sync::Arc;
use std::time::Duration;

use minebridge_protocol::{
    ActionSchema, Commands, DispatchCommand, MessageType, PlayerRef,
    PlayerServerCheck, PlayerStatusCheck, SendGlobalMessage,
    SendPlayerMessage, SendServerMessage,
};

use crate::BridgeError;
use crate::rewards::RewardStore;
use crate::state::BridgeState;

/// Cheap-to-clone handle for talking to connected game servers.
///
/// Obtained from [`BridgeServer::bridge`](crate::BridgeServer::bridge).
#[derive(Clone)]
pub struct Bridge {
    state: Arc<BridgeState>,
    response_timeout: Duration,
}

impl Bridge {
    pub(crate) fn new(state: Arc<BridgeState>) -> Self {
        let response_timeout = state.config.response_timeout();
        Self {
            state,
            response_timeout,
        }
    }

    /// Is the player online on any connected server?
    ///
    /// Returns `false` straight away when no game server is connected.
    pub async fn check_presence(&self, player: &PlayerRef) -> bool {
        if self.is_online_cached(player).await {
            tracing::debug!(%player, "presence cache hit");
            return true;
        }

        let (username, uuid) = player.to_fields();
        let query = PlayerStatusCheck {
            username,
            uuid,
            online: None,
        };
        if !self.ask(&query).await {
            return false;
        }
        self.is_online_cached(player).await
    }

    /// Which server is the player on?
    ///
    /// `None` if the player isn't online or no server answered in time.
    pub async fn fetch_server(&self, player: &PlayerRef) -> Option<String> {
        if let Some(server) = self.cached_server(player).await {
            tracing::debug!(%player, %server, "location cache hit");
            return Some(server);
        }

        if !self.check_presence(player).await {
            return None;
        }

        // The presence round trip may have carried a location report too.
        if let Some(server) = self.cached_server(player).await {
            return Some(server);
        }

        if let Some(only) = self.state.servers.lock().await.only() {
            return Some(only.to_owned());
        }

        let (username, uuid) = player.to_fields();
        let query = PlayerServerCheck {
            username,
            uuid,
            server: None,
        };
        if !self.ask(&query).await {
            return None;
        }
        self.cached_server(player).await
    }

    /// Resolves a username to the account UUID reported by a game server.
    ///
    /// Needs the player online, since only presence reports carry both keys.
    pub async fn fetch_uuid(&self, username: &str) -> Option<String> {
        let player = PlayerRef::Username(username.to_owned());
        if let Some(uuid) = self.cached_uuid(username).await {
            return Some(uuid);
        }
        if !self.check_presence(&player).await {
            return None;
        }
        self.cached_uuid(username).await
    }

    /// Resolves an account UUID to the player's current name.
    pub async fn fetch_username(&self, uuid: &str) -> Option<String> {
        let player = PlayerRef::Uuid(uuid.to_owned());
        if let Some(name) = self.cached_username(uuid).await {
            return Some(name);
        }
        if !self.check_presence(&player).await {
            return None;
        }
        self.cached_username(uuid).await
    }

    /// Sends a chat message to one player, wherever they are.
    ///
    /// Returns `false` without sending when the player isn't confirmed
    /// online.
    pub async fn send_player_message(
        &self,
        player: &PlayerRef,
        message_type: MessageType,
        message: &str,
    ) -> bool {
        if !self.check_presence(player).await {
            tracing::debug!(%player, "player offline, message not sent");
            return false;
        }

        let (username, uuid) = player.to_fields();
        let payload = SendPlayerMessage {
            username,
            uuid,
            message_type,
            message: message.to_owned(),
        };
        self.broadcast(&payload).await
    }

    /// Sends a chat message to everyone on one server.
    ///
    /// Returns `false` for an unknown server or when nothing hosting it is
    /// connected.
    pub async fn send_server_message(
        &self,
        server: &str,
        message_type: MessageType,
        message: &str,
    ) -> bool {
        if !self.is_known(server).await {
            tracing::warn!(server, "message for unknown server not sent");
            return false;
        }

        let payload = SendServerMessage {
            server: server.to_owned(),
            message_type,
            message: message.to_owned(),
        };
        match self.state.frame(&payload) {
            Ok(text) => self.state.send_to_hosts(server, &text).await > 0,
            Err(e) => {
                tracing::warn!(server, error = %e, "invalid server message");
                false
            }
        }
    }

    /// Sends a chat message to every connected server.
    pub async fn send_global_message(
        &self,
        message_type: MessageType,
        message: &str,
    ) -> bool {
        let payload = SendGlobalMessage {
            message_type,
            message: message.to_owned(),
        };
        self.broadcast(&payload).await
    }

    /// Runs console commands on one server.
    ///
    /// `Ok(false)` means the server is known but no connection hosting it
    /// took the frame.
    ///
    /// # Errors
    /// - [`BridgeError::UnknownServer`] if `server` never appeared in a
    ///   server list
    /// - [`BridgeError::Protocol`] if the command list is empty or blank
    pub async fn dispatch_command(
        &self,
        server: &str,
        commands: impl Into<Commands>,
    ) -> Result<bool, BridgeError> {
        if !self.is_known(server).await {
            return Err(BridgeError::UnknownServer(server.to_owned()));
        }

        let payload = DispatchCommand {
            server: server.to_owned(),
            commands: commands.into(),
        };
        let text = self.state.frame(&payload)?;
        let delivered = self.state.send_to_hosts(server, &text).await;
        tracing::info!(
            server,
            commands = payload.commands.len(),
            delivered,
            "commands dispatched"
        );
        Ok(delivered > 0)
    }

    /// Dispatches a user's pending rewards on the server they're playing on.
    ///
    /// The server's list is cleared only after the commands went out.
    /// `Ok(false)` covers every "nothing happened" case: unknown user, no
    /// linked account, nothing pending there, player offline.
    ///
    /// # Errors
    /// Returns [`BridgeError::RewardStore`] if the store fails.
    pub async fn deliver_rewards<R: RewardStore>(
        &self,
        store: &R,
        user_id: u64,
    ) -> Result<bool, BridgeError> {
        let record = store.load(user_id).await.map_err(store_error)?;
        let Some(record) = record.filter(|r| r.has_pending()) else {
            tracing::debug!(user_id, "no pending rewards");
            return Ok(false);
        };
        let Some(uuid) = record.minecraft_uuid.clone() else {
            tracing::debug!(user_id, "no linked game account");
            return Ok(false);
        };

        let Some(server) = self.fetch_server(&PlayerRef::Uuid(uuid)).await else {
            tracing::debug!(user_id, "player not reachable, rewards kept");
            return Ok(false);
        };
        let Some(commands) = record.pending_for(&server) else {
            tracing::debug!(user_id, %server, "no rewards for current server");
            return Ok(false);
        };

        let delivered = match self.dispatch_command(&server, commands.to_vec()).await {
            Ok(delivered) => delivered,
            Err(e) => {
                tracing::error!(user_id, %server, error = %e, "reward dispatch failed");
                return Ok(false);
            }
        };
        if !delivered {
            return Ok(false);
        }

        store
            .clear_server(user_id, &server)
            .await
            .map_err(store_error)?;
        tracing::info!(user_id, %server, "rewards delivered");
        Ok(true)
    }

    /// Every server name any game server has declared.
    pub async fn known_servers(&self) -> Vec<String> {
        self.state.servers.lock().await.names().to_vec()
    }

    /// Number of authenticated connections.
    pub async fn connected_clients(&self) -> usize {
        self.state.clients.lock().await.len()
    }

    /// Presence cache lookup without any round trip.
    pub async fn is_online_cached(&self, player: &PlayerRef) -> bool {
        self.state.presence.lock().await.is_online(player.key())
    }

    /// Location cache lookup without any round trip.
    pub async fn cached_server(&self, player: &PlayerRef) -> Option<String> {
        self.state.presence.lock().await.server_of(player.key())
    }

    async fn cached_uuid(&self, username: &str) -> Option<String> {
        self.state.presence.lock().await.uuid_of(username)
    }

    async fn cached_username(&self, uuid: &str) -> Option<String> {
        self.state.presence.lock().await.username_of(uuid)
    }

    async fn is_known(&self, server: &str) -> bool {
        self.state.servers.lock().await.contains(server)
    }

    /// Broadcasts a query and waits out the response timeout.
    ///
    /// Returns `false`, without waiting, if nobody received it.
    async fn ask<S: ActionSchema>(&self, query: &S) -> bool {
        if !self.broadcast(query).await {
            tracing::debug!(action = S::ACTION, "no game server to ask");
            return false;
        }
        tokio::time::sleep(self.response_timeout).await;
        true
    }

    async fn broadcast<S: ActionSchema>(&self, payload: &S) -> bool {
        match self.state.frame(payload) {
            Ok(text) => self.state.broadcast(&text).await > 0,
            Err(e) => {
                tracing::warn!(action = S::ACTION, error = %e, "invalid outbound frame");
                false
            }
        }
    }
}

fn store_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> BridgeError {
    BridgeError::RewardStore(Box::new(e))
}
