//! Inbound action handlers and the routine that registers them.
//!
//! Game servers send three kinds of frames: `authenticate` once after
//! connecting, then `player-status-check` and `player-server-check` reports
//! answering the bridge's broadcast queries. Reports never get a reply;
//! they only feed the presence cache.

use std::sync::Arc;

use minebridge_protocol::{
    AUTHENTICATE, ActionRegistry, AuthReply, Authenticate, Codec,
    PLAYER_SERVER_CHECK, PLAYER_STATUS_CHECK, PlayerServerCheck,
    PlayerStatusCheck,
};
use minebridge_session::Authenticator;
use minebridge_transport::{CloseCode, Connection, ConnectionId};

use crate::BridgeError;
use crate::listener::close_bounded;
use crate::state::{BridgeState, ClientHandle};

/// Close reason sent when the shared secret doesn't match.
pub const AUTH_FAILED_REASON: &str =
    "Authentication failed: Invalid credentials provided";

/// What a handler gets besides its payload.
pub(crate) struct ActionContext {
    pub(crate) conn: ClientHandle,
    pub(crate) state: Arc<BridgeState>,
}

impl ActionContext {
    fn conn_id(&self) -> ConnectionId {
        self.conn.id()
    }
}

pub(crate) type BridgeRegistry = ActionRegistry<ActionContext, BridgeError>;

/// Builds the registry with every inbound action the bridge understands.
pub(crate) fn build_registry<A: Authenticator>(auth: A) -> BridgeRegistry {
    let auth = Arc::new(auth);
    let mut registry = BridgeRegistry::new();

    registry.register(AUTHENTICATE, move |ctx, payload: Authenticate| {
        let auth = Arc::clone(&auth);
        async move { authenticate(ctx, payload, auth.as_ref()).await }
    });
    registry.register(PLAYER_STATUS_CHECK, player_status_report);
    registry.register(PLAYER_SERVER_CHECK, player_server_report);

    registry
}

/// Checks the secret; on success binds the connection to its declared
/// servers and acknowledges.
///
/// A bad secret closes the connection with a policy-violation code and
/// returns the authenticator's error so the listener stops reading.
async fn authenticate<A: Authenticator>(
    ctx: ActionContext,
    payload: Authenticate,
    auth: &A,
) -> Result<(), BridgeError> {
    let conn_id = ctx.conn_id();

    if let Err(e) = auth.authenticate(&payload.password).await {
        tracing::warn!(
            %conn_id,
            peer = %ctx.conn.peer_addr(),
            error = %e,
            "authentication failed, closing connection"
        );
        close_bounded(
            &ctx.conn,
            CloseCode::PolicyViolation,
            AUTH_FAILED_REASON,
            ctx.state.config.close_timeout(),
        )
        .await;
        return Err(e.into());
    }

    ctx.state.clients.lock().await.bind(
        conn_id,
        Arc::clone(&ctx.conn),
        payload.server_list.clone(),
    );
    let added = ctx.state.servers.lock().await.extend(&payload.server_list);

    tracing::info!(
        %conn_id,
        servers = ?payload.server_list,
        new = added.len(),
        "game server authenticated"
    );

    let reply = ctx.state.codec.encode_text(&AuthReply::success())?;
    ctx.conn.send(&reply).await?;
    Ok(())
}

/// Records a presence report. Only `online: true` is stored; anything else
/// is treated as "unknown" and left to expire.
async fn player_status_report(
    ctx: ActionContext,
    payload: PlayerStatusCheck,
) -> Result<(), BridgeError> {
    if payload.online != Some(true) {
        tracing::debug!(
            conn_id = %ctx.conn_id(),
            username = ?payload.username,
            uuid = ?payload.uuid,
            "ignoring status report without online=true"
        );
        return Ok(());
    }

    ctx.state
        .presence
        .lock()
        .await
        .record_online(payload.username.as_deref(), payload.uuid.as_deref());
    tracing::debug!(
        conn_id = %ctx.conn_id(),
        username = ?payload.username,
        uuid = ?payload.uuid,
        "player online"
    );
    Ok(())
}

/// Records a location report for a known server.
///
/// The reporting connection isn't required to host the server it names.
async fn player_server_report(
    ctx: ActionContext,
    payload: PlayerServerCheck,
) -> Result<(), BridgeError> {
    let Some(server) = payload.server.as_deref() else {
        tracing::debug!(conn_id = %ctx.conn_id(), "location report without server");
        return Ok(());
    };

    if !ctx.state.servers.lock().await.contains(server) {
        tracing::warn!(
            conn_id = %ctx.conn_id(),
            server,
            "location report names an unknown server"
        );
        return Ok(());
    }

    ctx.state.presence.lock().await.record_location(
        payload.username.as_deref(),
        payload.uuid.as_deref(),
        server,
    );
    tracing::debug!(
        conn_id = %ctx.conn_id(),
        username = ?payload.username,
        uuid = ?payload.uuid,
        server,
        "player location recorded"
    );
    Ok(())
}
