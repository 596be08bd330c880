//! Per-connection task: read frames, dispatch actions, keep the link alive.
//!
//! Every accepted connection gets one task running [`handle_connection`].
//! The loop ends when the peer closes or the socket errors. It also ends
//! when the keep-alive gives up, when authentication fails, when a stalled
//! peer has been evicted, or when the server starts shutting down.
//! Whichever way it ends, the connection's client-table entry goes with it
//! before the task returns.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use minebridge_session::SessionError;
use minebridge_transport::{CloseCode, Connection, ConnectionId};
use tokio::sync::watch;

use crate::BridgeError;
use crate::actions::{ActionContext, BridgeRegistry};
use crate::state::{BridgeState, ClientHandle};

/// Longest slice of a bad frame echoed into the logs.
const LOG_PREVIEW_LEN: usize = 100;

/// Where a connection is in its life, as seen by the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectionState {
    /// Open, no accepted `authenticate` yet.
    Connected,
    /// Bound to its server list in the client table.
    Authenticated,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::Authenticated => f.write_str("authenticated"),
        }
    }
}

/// Fallback cleanup for tasks that never reach the end of
/// [`handle_connection`], i.e. panics and tasks aborted after the shutdown
/// grace period. `Drop` is synchronous, so the removal runs on a spawned
/// task. Normal exits remove the entry inline and disarm the guard.
struct ClientGuard {
    conn_id: ConnectionId,
    state: Arc<BridgeState>,
    armed: bool,
}

impl ClientGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        runtime.spawn(async move {
            if let Ok(client) = state.clients.lock().await.remove(conn_id) {
                tracing::info!(
                    %conn_id,
                    servers = ?client.server_list,
                    "game server disconnected"
                );
            }
        });
    }
}

/// Why the read loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    PeerClosed,
    Shutdown,
    KeepAliveExpired,
    Rejected,
    /// Dropped from the client table after a send to it timed out.
    Evicted,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: ClientHandle,
    state: Arc<BridgeState>,
    registry: Arc<BridgeRegistry>,
    mut shutdown: watch::Receiver<bool>,
) {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let mut guard = ClientGuard {
        conn_id,
        state: Arc::clone(&state),
        armed: true,
    };

    let ping_interval = state.config.ping_interval();
    let ping_timeout = state.config.ping_timeout();
    let idle_limit = ping_interval + ping_timeout;
    let mut authenticated = false;

    let exit = loop {
        if *shutdown.borrow() {
            break Exit::Shutdown;
        }

        let received = tokio::select! {
            changed = shutdown.changed() => {
                // A dropped sender means the server is gone as well.
                if changed.is_err() || *shutdown.borrow() {
                    break Exit::Shutdown;
                }
                continue;
            }
            received = tokio::time::timeout(ping_interval, conn.recv()) => received,
        };

        let data = match received {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => break Exit::PeerClosed,
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break Exit::PeerClosed;
            }
            Err(_elapsed) => {
                if authenticated && !state.is_authenticated(conn_id).await {
                    break Exit::Evicted;
                }
                if conn.idle_for() >= idle_limit {
                    break Exit::KeepAliveExpired;
                }
                match tokio::time::timeout(ping_timeout, conn.ping()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::debug!(%conn_id, error = %e, "ping failed");
                        break Exit::PeerClosed;
                    }
                    Err(_) => {
                        tracing::debug!(%conn_id, "ping timed out");
                        break Exit::Evicted;
                    }
                }
                continue;
            }
        };

        let conn_state = if state.is_authenticated(conn_id).await {
            ConnectionState::Authenticated
        } else {
            ConnectionState::Connected
        };
        if authenticated && conn_state == ConnectionState::Connected {
            break Exit::Evicted;
        }

        if let Err(BridgeError::Session(SessionError::AuthFailed(_))) =
            dispatch_frame(&conn, &state, &registry, conn_state, &data).await
        {
            break Exit::Rejected;
        }
        authenticated = state.is_authenticated(conn_id).await;
    };

    match exit {
        Exit::Shutdown => {
            close_bounded(
                &conn,
                CloseCode::GoingAway,
                "server shutting down",
                state.config.close_timeout(),
            )
            .await;
        }
        Exit::KeepAliveExpired => {
            tracing::info!(%conn_id, "keep-alive expired, closing connection");
            close_bounded(
                &conn,
                CloseCode::GoingAway,
                "keep-alive timeout",
                state.config.close_timeout(),
            )
            .await;
        }
        Exit::Evicted => {
            tracing::info!(%conn_id, "dropping evicted connection");
        }
        Exit::PeerClosed | Exit::Rejected => {}
    }

    if let Ok(client) = state.clients.lock().await.remove(conn_id) {
        tracing::info!(
            %conn_id,
            servers = ?client.server_list,
            "game server disconnected"
        );
    }
    guard.disarm();

    tracing::debug!(%conn_id, ?exit, "connection handler finished");
}

/// Decodes one frame and runs its handler.
///
/// Frames that fail to decode or validate are logged and dropped; the
/// connection stays open. Only a handler error is returned, and only so
/// the caller can tell a rejected `authenticate` apart.
async fn dispatch_frame(
    conn: &ClientHandle,
    state: &Arc<BridgeState>,
    registry: &BridgeRegistry,
    conn_state: ConnectionState,
    data: &[u8],
) -> Result<(), BridgeError> {
    let conn_id = conn.id();

    let prepared = match registry.prepare(&state.codec, data) {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::warn!(
                %conn_id,
                error = %e,
                frame = %preview(data),
                "dropping invalid frame"
            );
            return Ok(());
        }
    };

    if prepared.requires_auth() && conn_state != ConnectionState::Authenticated {
        tracing::warn!(
            %conn_id,
            action = prepared.action(),
            state = %conn_state,
            "dropping action from unauthenticated connection"
        );
        return Ok(());
    }

    let action = prepared.action().to_owned();
    tracing::debug!(%conn_id, %action, state = %conn_state, "dispatching action");

    let ctx = ActionContext {
        conn: Arc::clone(conn),
        state: Arc::clone(state),
    };
    prepared.run(ctx).await.inspect_err(|e| {
        if !matches!(e, BridgeError::Session(SessionError::AuthFailed(_))) {
            tracing::warn!(%conn_id, %action, error = %e, "action handler failed");
        }
    })
}

/// Sends a close frame, giving up after `limit`.
pub(crate) async fn close_bounded(
    conn: &ClientHandle,
    code: CloseCode,
    reason: &str,
    limit: Duration,
) {
    match tokio::time::timeout(limit, conn.close(code, reason)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::debug!(conn_id = %conn.id(), error = %e, "close failed");
        }
        Err(_) => {
            tracing::debug!(conn_id = %conn.id(), "close timed out");
        }
    }
}

fn preview(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    text.chars().take(LOG_PREVIEW_LEN).collect()
}
