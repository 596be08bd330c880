//! Runs a bridge server from a JSON settings file until Ctrl-C.
//!
//! ```text
//! cargo run -p bridge-server -- demos/bridge-server/settings.example.json
//! ```
//!
//! Every minute it logs the connected game servers, to show the facade in
//! use alongside the listener. Nothing is sent to players.

use std::time::Duration;

use minebridge::prelude::*;

const DEFAULT_SETTINGS: &str = "settings.json";

#[tokio::main]
async fn main() -> Result<(), BridgeError> {
    minebridge::init_tracing();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS.to_owned());
    let config = BridgeConfig::from_json_file(&path)?;

    let server = BridgeServer::builder().config(config).build().await?;
    tracing::info!(addr = %server.local_addr()?, settings = %path, "listening");

    let bridge = server.bridge();
    let heartbeat = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let servers = bridge.known_servers().await;
            let connected = bridge.connected_clients().await;
            tracing::info!(connected, servers = ?servers, "bridge status");
        }
    });

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "cannot listen for Ctrl-C");
            }
        })
        .await?;

    heartbeat.abort();
    Ok(())
}
