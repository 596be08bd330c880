//! `BridgeServer` builder and server loop.
//!
//! This is the entry point for running the bridge. It ties together all
//! the layers: transport → protocol → session → presence caches.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use minebridge_session::{Authenticator, SharedSecret};
use minebridge_transport::{Handshake, Transport, WebSocketTransport};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::BridgeError;
use crate::actions::{BridgeRegistry, build_registry};
use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::listener::handle_connection;
use crate::state::BridgeState;

/// Builder for configuring and starting a bridge server.
///
/// # Example
///
/// ```rust,ignore
/// use minebridge::prelude::*;
///
/// let server = BridgeServer::builder()
///     .bind("0.0.0.0:8080")
///     .password("change-me-please")
///     .build()
///     .await?;
/// let bridge = server.bridge();
/// server.run_until(async { tokio::signal::ctrl_c().await.ok(); }).await
/// ```
pub struct BridgeServerBuilder {
    config: BridgeConfig,
    bind_addr: Option<String>,
}

impl BridgeServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: BridgeConfig::default(),
            bind_addr: None,
        }
    }

    /// Replaces all settings, e.g. with ones loaded from a file.
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind to, overriding `host` and `port`.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = Some(addr.to_string());
        self
    }

    /// Sets the shared secret game servers must present.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.auth.password = password.into();
        self
    }

    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config.response_timeout_ms =
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn cache_ttl_secs(mut self, secs: u64) -> Self {
        self.config.cache_ttl_secs = secs;
        self
    }

    pub fn ping_interval_secs(mut self, secs: u64) -> Self {
        self.config.ping_interval_secs = secs;
        self
    }

    pub fn ping_timeout_secs(mut self, secs: u64) -> Self {
        self.config.ping_timeout_secs = secs;
        self
    }

    /// Bounds a close handshake and each outbound frame.
    pub fn close_timeout_secs(mut self, secs: u64) -> Self {
        self.config.close_timeout_secs = secs;
        self
    }

    pub fn shutdown_grace_secs(mut self, secs: u64) -> Self {
        self.config.shutdown_grace_secs = secs;
        self
    }

    /// Builds the server, authenticating against the configured secret.
    ///
    /// # Errors
    /// Fails if the settings don't validate or the address can't be bound.
    pub async fn build(self) -> Result<BridgeServer, BridgeError> {
        let secret = SharedSecret::new(self.config.auth.password.clone());
        self.build_with(secret).await
    }

    /// Builds the server with a custom authenticator.
    ///
    /// The configured password still has to validate.
    pub async fn build_with(
        self,
        auth: impl Authenticator,
    ) -> Result<BridgeServer, BridgeError> {
        self.config.validate()?;
        let addr = self
            .bind_addr
            .unwrap_or_else(|| self.config.bind_addr());
        let transport = WebSocketTransport::bind(&addr).await?;

        let state = Arc::new(BridgeState::new(self.config));
        let registry = Arc::new(build_registry(auth));
        let (shutdown, _) = watch::channel(false);

        tracing::debug!(actions = registry.len(), %addr, "bridge server built");

        Ok(BridgeServer {
            transport,
            state,
            registry,
            shutdown: Arc::new(shutdown),
        })
    }
}

impl Default for BridgeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Asks a running [`BridgeServer`] to stop. Cloneable; any clone works.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Starts shutdown. Calling it again does nothing.
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

/// A bridge server bound to its address but not yet accepting.
///
/// Call [`run()`](Self::run) or [`run_until()`](Self::run_until) to start
/// accepting connections.
pub struct BridgeServer {
    transport: WebSocketTransport,
    state: Arc<BridgeState>,
    registry: Arc<BridgeRegistry>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl BridgeServer {
    /// Creates a new builder.
    pub fn builder() -> BridgeServerBuilder {
        BridgeServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, BridgeError> {
        Ok(self.transport.local_addr()?)
    }

    /// The facade for querying and messaging game servers.
    pub fn bridge(&self) -> Bridge {
        Bridge::new(Arc::clone(&self.state))
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown),
        }
    }

    /// Runs until a [`ShutdownHandle`] fires.
    pub async fn run(self) -> Result<(), BridgeError> {
        self.run_until(std::future::pending()).await
    }

    /// Accepts connections until `signal` resolves or a
    /// [`ShutdownHandle`] fires, then shuts down.
    ///
    /// Shutdown stops accepting, tells every connection task to close with
    /// "going away", waits up to the grace period, and aborts whatever is
    /// still running.
    pub async fn run_until<F>(self, signal: F) -> Result<(), BridgeError>
    where
        F: Future<Output = ()>,
    {
        let Self {
            mut transport,
            state,
            registry,
            shutdown,
        } = self;

        tracing::info!(addr = ?transport.local_addr().ok(), "bridge server running");

        let sweeper = tokio::spawn(sweep_caches(Arc::clone(&state)));
        let mut connections = JoinSet::new();
        let mut stop = shutdown.subscribe();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                () = &mut signal => {
                    tracing::info!("shutdown signal received");
                    break;
                }
                () = stop_requested(&mut stop) => {
                    tracing::info!("shutdown requested");
                    break;
                }
                accepted = transport.accept() => match accepted {
                    Ok(pending) => {
                        let state = Arc::clone(&state);
                        let registry = Arc::clone(&registry);
                        let stop = shutdown.subscribe();
                        connections.spawn(async move {
                            let peer = pending.peer_addr();
                            match pending.complete().await {
                                Ok(conn) => {
                                    handle_connection(
                                        Arc::new(conn),
                                        state,
                                        registry,
                                        stop,
                                    )
                                    .await;
                                }
                                Err(e) => {
                                    tracing::warn!(
                                        %peer,
                                        error = %e,
                                        "WebSocket upgrade failed"
                                    );
                                }
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                    }
                },
            }

            while let Some(finished) = connections.try_join_next() {
                if let Err(e) = finished {
                    tracing::error!(error = %e, "connection task failed");
                }
            }
        }

        shutdown.send_replace(true);
        if let Err(e) = transport.shutdown().await {
            tracing::debug!(error = %e, "transport shutdown failed");
        }
        drop(transport);

        let grace = state.config.shutdown_grace();
        let drained = tokio::time::timeout(grace, async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            tracing::warn!(
                remaining = connections.len(),
                "grace period over, aborting connection tasks"
            );
            connections.shutdown().await;
        }

        sweeper.abort();
        tracing::info!("bridge server stopped");
        Ok(())
    }
}

async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|stopped| *stopped).await;
}

/// Drops expired cache entries every half TTL.
async fn sweep_caches(state: Arc<BridgeState>) {
    let period = (state.config.cache_ttl() / 2).max(Duration::from_millis(100));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let removed = state.presence.lock().await.sweep();
        if removed > 0 {
            tracing::debug!(removed, "expired cache entries swept");
        }
    }
}
