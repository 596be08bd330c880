//! Integration tests for the bridge server, listener, and facade.
//!
//! Each test starts a real server on a loopback port and plays the part of
//! one or more game servers with `tokio-tungstenite` clients.

use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use minebridge::prelude::*;
use minebridge::AUTH_FAILED_REASON;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

const SECRET: &str = "correct-horse-battery";
const UUID: &str = "0f3c1e5a9b7d4c2e8a6f1b3d5c7e9a0b";
const RESPONSE_TIMEOUT: Duration = Duration::from_millis(200);

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

struct TestServer {
    addr: String,
    bridge: Bridge,
    shutdown: ShutdownHandle,
    task: JoinHandle<Result<(), BridgeError>>,
}

/// Starts a server on a random port with a short response timeout.
async fn start_server() -> TestServer {
    start_server_with(|builder| builder).await
}

async fn start_server_with(
    configure: impl FnOnce(BridgeServerBuilder) -> BridgeServerBuilder,
) -> TestServer {
    let builder = BridgeServer::builder()
        .bind("127.0.0.1:0")
        .password(SECRET)
        .response_timeout(RESPONSE_TIMEOUT);
    let server = configure(builder).build().await.expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();
    let bridge = server.bridge();
    let shutdown = server.shutdown_handle();
    let task = tokio::spawn(server.run());

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    TestServer {
        addr,
        bridge,
        shutdown,
        task,
    }
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send_json(ws: &mut ClientWs, value: Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("send should succeed");
}

/// Next text frame as JSON, skipping control frames.
async fn recv_json(ws: &mut ClientWs) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str())
                    .expect("frame should be JSON");
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

/// Asserts no data frame arrives for a little while.
async fn assert_silent(ws: &mut ClientWs) {
    match tokio::time::timeout(Duration::from_millis(100), ws.next()).await {
        Err(_) => {}
        Ok(other) => panic!("expected no frame, got {other:?}"),
    }
}

async fn authenticate(ws: &mut ClientWs, servers: &[&str]) -> Value {
    send_json(
        ws,
        json!({
            "action": "authenticate",
            "password": SECRET,
            "server_list": servers,
        }),
    )
    .await;
    recv_json(ws).await
}

/// Connects and authenticates one game server.
async fn game_server(addr: &str, servers: &[&str]) -> ClientWs {
    let mut ws = connect(addr).await;
    let reply = authenticate(&mut ws, servers).await;
    assert_eq!(reply["status"], "success");
    ws
}

/// Frames on one connection are handled in order, so once a repeated
/// `authenticate` is acknowledged everything sent before it has landed.
async fn barrier(ws: &mut ClientWs, servers: &[&str]) {
    let reply = authenticate(ws, servers).await;
    assert_eq!(reply["status"], "success");
}

async fn report_online(ws: &mut ClientWs, username: &str, uuid: &str) {
    send_json(
        ws,
        json!({
            "action": "player-status-check",
            "username": username,
            "uuid": uuid,
            "online": true,
        }),
    )
    .await;
}

async fn report_location(ws: &mut ClientWs, username: &str, server: &str) {
    send_json(
        ws,
        json!({
            "action": "player-server-check",
            "username": username,
            "server": server,
        }),
    )
    .await;
}

async fn wait_for_clients(bridge: &Bridge, expected: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while bridge.connected_clients().await != expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("client count should settle");
}

fn steve() -> PlayerRef {
    PlayerRef::Username("Steve".into())
}

// =========================================================================
// Authentication
// =========================================================================

#[tokio::test]
async fn test_authenticate_valid_secret_replies_success() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;

    let reply = authenticate(&mut ws, &["lobby", "survival"]).await;

    assert_eq!(
        reply,
        json!({"status": "success", "message": "Authentication successful"})
    );
    assert_eq!(server.bridge.known_servers().await, vec!["lobby", "survival"]);
    assert_eq!(server.bridge.connected_clients().await, 1);
}

#[tokio::test]
async fn test_authenticate_wrong_secret_closes_with_policy_violation() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;

    send_json(
        &mut ws,
        json!({
            "action": "authenticate",
            "password": "wrong-secret",
            "server_list": ["lobby"],
        }),
    )
    .await;

    match tokio::time::timeout(Duration::from_secs(2), ws.next()).await {
        Ok(Some(Ok(Message::Close(Some(frame))))) => {
            assert_eq!(u16::from(frame.code), 1008);
            assert_eq!(frame.reason.as_str(), AUTH_FAILED_REASON);
        }
        other => panic!("expected close frame, got {other:?}"),
    }
    assert_eq!(server.bridge.connected_clients().await, 0);
    assert!(server.bridge.known_servers().await.is_empty());
}

#[tokio::test]
async fn test_reauthenticate_same_list_is_idempotent() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["lobby", "survival"]).await;

    barrier(&mut ws, &["lobby", "survival"]).await;

    assert_eq!(server.bridge.known_servers().await, vec!["lobby", "survival"]);
    assert_eq!(server.bridge.connected_clients().await, 1);
}

#[tokio::test]
async fn test_reauthenticate_extends_known_servers() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["lobby"]).await;

    barrier(&mut ws, &["lobby", "creative"]).await;

    assert_eq!(server.bridge.known_servers().await, vec!["lobby", "creative"]);
    assert_eq!(server.bridge.connected_clients().await, 1);
}

#[tokio::test]
async fn test_report_before_authenticate_is_dropped() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;

    report_online(&mut ws, "Steve", UUID).await;
    let reply = authenticate(&mut ws, &["lobby"]).await;
    assert_eq!(reply["status"], "success");

    assert!(!server.bridge.is_online_cached(&steve()).await);
}

#[tokio::test]
async fn test_invalid_frames_keep_connection_open() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["lobby"]).await;

    ws.send(Message::text("{not json")).await.unwrap();
    send_json(&mut ws, json!({"action": "teleport", "username": "Steve"})).await;
    send_json(&mut ws, json!({"username": "Steve"})).await;
    // Username too long for the schema.
    send_json(
        &mut ws,
        json!({
            "action": "player-status-check",
            "username": "ThisNameIsFarTooLong",
            "online": true,
        }),
    )
    .await;
    // Unknown server in a location report.
    report_location(&mut ws, "Steve", "skyblock").await;

    barrier(&mut ws, &["lobby"]).await;

    assert_eq!(server.bridge.connected_clients().await, 1);
    assert_eq!(server.bridge.known_servers().await, vec!["lobby"]);
    assert!(
        !server
            .bridge
            .is_online_cached(&PlayerRef::Username("ThisNameIsFarTooLong".into()))
            .await
    );
    assert_eq!(server.bridge.cached_server(&steve()).await, None);
}

// =========================================================================
// Connection lifecycle
// =========================================================================

#[tokio::test]
async fn test_disconnect_removes_client_entry() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["survival"]).await;
    assert_eq!(server.bridge.connected_clients().await, 1);

    ws.close(None).await.unwrap();
    drop(ws);

    wait_for_clients(&server.bridge, 0).await;
    // The name stays valid after its host goes away.
    assert_eq!(server.bridge.known_servers().await, vec!["survival"]);
}

#[tokio::test]
async fn test_shutdown_closes_connections_going_away() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["lobby"]).await;

    server.shutdown.shutdown();

    match tokio::time::timeout(Duration::from_secs(2), ws.next()).await {
        Ok(Some(Ok(Message::Close(Some(frame))))) => {
            assert_eq!(u16::from(frame.code), 1001);
        }
        other => panic!("expected close frame, got {other:?}"),
    }

    let result = tokio::time::timeout(Duration::from_secs(3), server.task)
        .await
        .expect("server should stop within the grace period")
        .expect("server task should not panic");
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_shutdown_removes_client_entries_before_returning() {
    let server = start_server().await;
    let _lobby = game_server(&server.addr, &["lobby"]).await;
    let _survival = game_server(&server.addr, &["survival"]).await;
    assert_eq!(server.bridge.connected_clients().await, 2);

    server.shutdown.shutdown();
    tokio::time::timeout(Duration::from_secs(3), server.task)
        .await
        .expect("server should stop within the grace period")
        .expect("server task should not panic")
        .expect("server should stop cleanly");

    // No settling loop: entries go before the connection task returns.
    assert_eq!(server.bridge.connected_clients().await, 0);
}

#[tokio::test]
async fn test_keep_alive_closes_silent_connection_going_away() {
    let server = start_server_with(|builder| {
        builder.ping_interval_secs(1).ping_timeout_secs(1)
    })
    .await;
    let mut ws = game_server(&server.addr, &["lobby"]).await;

    // Not polling means pings go unanswered.
    tokio::time::sleep(Duration::from_millis(3500)).await;

    let frame = loop {
        match tokio::time::timeout(Duration::from_secs(2), ws.next()).await {
            Ok(Some(Ok(Message::Ping(_)))) => continue,
            Ok(Some(Ok(Message::Close(Some(frame))))) => break frame,
            other => panic!("expected close frame, got {other:?}"),
        }
    };
    assert_eq!(u16::from(frame.code), 1001);
    assert_eq!(frame.reason.as_str(), "keep-alive timeout");

    wait_for_clients(&server.bridge, 0).await;
}

#[tokio::test]
async fn test_silent_tcp_client_does_not_block_upgrades() {
    let server = start_server().await;

    // Opens a socket and never sends the HTTP upgrade.
    let _silent = tokio::net::TcpStream::connect(&server.addr)
        .await
        .expect("raw connect");
    tokio::time::sleep(Duration::from_millis(20)).await;

    let ws = tokio::time::timeout(
        Duration::from_secs(3),
        game_server(&server.addr, &["lobby"]),
    )
    .await
    .expect("upgrade must not wait on the silent socket");
    drop(ws);
}

#[tokio::test]
async fn test_stalled_reader_does_not_block_facade() {
    let server = start_server_with(|builder| builder.close_timeout_secs(1)).await;
    // Authenticates, then never reads again.
    let _stalled = game_server(&server.addr, &["lobby"]).await;
    let mut healthy = game_server(&server.addr, &["survival"]).await;

    let big = "x".repeat(1 << 20);
    let mut evicted = false;
    for _ in 0..64 {
        let sent = tokio::time::timeout(
            Duration::from_secs(3),
            server.bridge.send_server_message("lobby", MessageType::Info, &big),
        )
        .await
        .expect("a stalled peer must not hang the facade");
        if !sent {
            evicted = true;
            break;
        }
    }
    assert!(evicted, "stalled connection should be evicted");
    assert_eq!(server.bridge.connected_clients().await, 1);

    let online = tokio::time::timeout(
        Duration::from_secs(3),
        server.bridge.check_presence(&steve()),
    )
    .await
    .expect("query should finish after its response timeout");
    assert!(!online);
    let frame = recv_json(&mut healthy).await;
    assert_eq!(frame["action"], "player-status-check");

    assert!(
        server
            .bridge
            .send_global_message(MessageType::Info, "still here")
            .await
    );
    let frame = recv_json(&mut healthy).await;
    assert_eq!(frame["message"], "still here");
}

#[tokio::test]
async fn test_run_until_signal_stops_server() {
    let server = BridgeServer::builder()
        .bind("127.0.0.1:0")
        .password(SECRET)
        .build()
        .await
        .expect("server should build");

    let result = tokio::time::timeout(
        Duration::from_secs(2),
        server.run_until(tokio::time::sleep(Duration::from_millis(50))),
    )
    .await
    .expect("run_until should return after the signal");
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_build_rejects_short_password() {
    let result = BridgeServer::builder()
        .bind("127.0.0.1:0")
        .password("short")
        .build()
        .await;
    assert!(matches!(result, Err(BridgeError::Config(_))));
}

// =========================================================================
// Presence and location queries
// =========================================================================

#[tokio::test]
async fn test_check_presence_without_connections_returns_immediately() {
    let server =
        start_server_with(|b| b.response_timeout(Duration::from_secs(5))).await;

    let online = tokio::time::timeout(
        Duration::from_secs(1),
        server.bridge.check_presence(&steve()),
    )
    .await
    .expect("must not wait for the response timeout");
    assert!(!online);
}

#[tokio::test]
async fn test_check_presence_round_trip_returns_true() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["lobby"]).await;

    let bridge = server.bridge.clone();
    let query = tokio::spawn(async move { bridge.check_presence(&steve()).await });

    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["action"], "player-status-check");
    assert_eq!(frame["username"], "Steve");
    assert!(frame.get("online").is_none());

    report_online(&mut ws, "Steve", UUID).await;

    assert!(query.await.unwrap());
    assert!(
        server
            .bridge
            .is_online_cached(&PlayerRef::Uuid(UUID.into()))
            .await
    );
}

#[tokio::test]
async fn test_check_presence_no_reply_returns_false_after_timeout() {
    let server = start_server().await;
    let _ws = game_server(&server.addr, &["lobby"]).await;

    let start = Instant::now();
    let online = server.bridge.check_presence(&steve()).await;

    assert!(!online);
    assert!(start.elapsed() >= RESPONSE_TIMEOUT);
}

#[tokio::test]
async fn test_check_presence_cached_sends_no_query() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["lobby"]).await;
    report_online(&mut ws, "Steve", UUID).await;
    barrier(&mut ws, &["lobby"]).await;

    let start = Instant::now();
    assert!(server.bridge.check_presence(&steve()).await);
    assert!(start.elapsed() < RESPONSE_TIMEOUT);

    assert_silent(&mut ws).await;
}

#[tokio::test]
async fn test_status_report_offline_is_not_cached() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["lobby"]).await;
    send_json(
        &mut ws,
        json!({"action": "player-status-check", "username": "Steve", "online": false}),
    )
    .await;
    barrier(&mut ws, &["lobby"]).await;

    assert!(!server.bridge.is_online_cached(&steve()).await);
}

#[tokio::test]
async fn test_fetch_uuid_and_username_use_reported_mapping() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["lobby"]).await;
    report_online(&mut ws, "Steve", UUID).await;
    barrier(&mut ws, &["lobby"]).await;

    assert_eq!(server.bridge.fetch_uuid("Steve").await.as_deref(), Some(UUID));
    assert_eq!(
        server.bridge.fetch_username(UUID).await.as_deref(),
        Some("Steve")
    );
    assert_silent(&mut ws).await;
}

#[tokio::test]
async fn test_fetch_server_single_known_server_short_circuits() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["survival"]).await;
    report_online(&mut ws, "Steve", UUID).await;
    barrier(&mut ws, &["survival"]).await;

    let found = server.bridge.fetch_server(&steve()).await;

    assert_eq!(found.as_deref(), Some("survival"));
    assert_silent(&mut ws).await;
}

#[tokio::test]
async fn test_fetch_server_offline_player_returns_none() {
    let server = start_server().await;
    let _ws = game_server(&server.addr, &["survival"]).await;

    assert_eq!(server.bridge.fetch_server(&steve()).await, None);
}

#[tokio::test]
async fn test_fetch_server_queries_location_when_several_servers() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["lobby", "survival"]).await;
    report_online(&mut ws, "Steve", UUID).await;
    barrier(&mut ws, &["lobby", "survival"]).await;

    let bridge = server.bridge.clone();
    let query = tokio::spawn(async move { bridge.fetch_server(&steve()).await });

    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["action"], "player-server-check");
    assert_eq!(frame["username"], "Steve");
    report_location(&mut ws, "Steve", "survival").await;

    assert_eq!(query.await.unwrap().as_deref(), Some("survival"));
}

#[tokio::test]
async fn test_location_report_resolves_to_reported_server() {
    let server = start_server().await;
    let mut sv_a = game_server(&server.addr, &["svA"]).await;
    let mut sv_b = game_server(&server.addr, &["svB"]).await;
    assert_eq!(server.bridge.known_servers().await, vec!["svA", "svB"]);

    report_location(&mut sv_a, "Steve", "svA").await;
    barrier(&mut sv_a, &["svA"]).await;

    for _ in 0..3 {
        assert_eq!(
            server.bridge.fetch_server(&steve()).await.as_deref(),
            Some("svA")
        );
    }
    assert_silent(&mut sv_a).await;
    assert_silent(&mut sv_b).await;
}

#[tokio::test]
async fn test_presence_cache_expires_after_ttl() {
    let server = start_server_with(|b| b.cache_ttl_secs(1)).await;
    let mut ws = game_server(&server.addr, &["lobby"]).await;
    report_online(&mut ws, "Steve", UUID).await;
    barrier(&mut ws, &["lobby"]).await;
    assert!(server.bridge.is_online_cached(&steve()).await);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert!(!server.bridge.is_online_cached(&steve()).await);
}

// =========================================================================
// Messages and commands
// =========================================================================

#[tokio::test]
async fn test_send_server_message_unknown_server_returns_false() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["lobby"]).await;

    let sent = server
        .bridge
        .send_server_message("skyblock", MessageType::Info, "hello")
        .await;

    assert!(!sent);
    assert_silent(&mut ws).await;
}

#[tokio::test]
async fn test_send_server_message_reaches_hosting_connection() {
    let server = start_server().await;
    let mut lobby = game_server(&server.addr, &["lobby"]).await;
    let mut survival = game_server(&server.addr, &["survival"]).await;

    let sent = server
        .bridge
        .send_server_message("survival", MessageType::Warn, "Restarting soon")
        .await;

    assert!(sent);
    assert_eq!(
        recv_json(&mut survival).await,
        json!({
            "action": "send-server-message",
            "server": "survival",
            "message_type": "WARN",
            "message": "Restarting soon",
        })
    );
    assert_silent(&mut lobby).await;
}

#[tokio::test]
async fn test_send_global_message_reaches_every_connection() {
    let server = start_server().await;
    let mut lobby = game_server(&server.addr, &["lobby"]).await;
    let mut survival = game_server(&server.addr, &["survival"]).await;

    assert!(
        server
            .bridge
            .send_global_message(MessageType::Announce, "Event starting!")
            .await
    );

    for ws in [&mut lobby, &mut survival] {
        let frame = recv_json(ws).await;
        assert_eq!(frame["action"], "send-global-message");
        assert_eq!(frame["message_type"], "ANNOUNCE");
        assert_eq!(frame["message"], "Event starting!");
    }
}

#[tokio::test]
async fn test_send_global_message_without_connections_returns_false() {
    let server = start_server().await;
    assert!(
        !server
            .bridge
            .send_global_message(MessageType::Info, "anyone?")
            .await
    );
}

#[tokio::test]
async fn test_send_player_message_offline_returns_false() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["lobby"]).await;

    let sent = server
        .bridge
        .send_player_message(&steve(), MessageType::Info, "hi")
        .await;

    assert!(!sent);
    // Only the presence query went out.
    assert_eq!(recv_json(&mut ws).await["action"], "player-status-check");
    assert_silent(&mut ws).await;
}

#[tokio::test]
async fn test_send_player_message_online_is_broadcast() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["lobby"]).await;
    report_online(&mut ws, "Steve", UUID).await;
    barrier(&mut ws, &["lobby"]).await;

    let sent = server
        .bridge
        .send_player_message(&steve(), MessageType::Success, "Reward ready")
        .await;

    assert!(sent);
    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["action"], "send-player-message");
    assert_eq!(frame["username"], "Steve");
    assert_eq!(frame["message_type"], "SUCCESS");
    assert!(frame.get("uuid").is_none());
}

#[tokio::test]
async fn test_dispatch_command_unknown_server_errors() {
    let server = start_server().await;
    let _ws = game_server(&server.addr, &["lobby"]).await;

    let result = server.bridge.dispatch_command("skyblock", "say hi").await;

    assert!(matches!(result, Err(BridgeError::UnknownServer(name)) if name == "skyblock"));
}

#[tokio::test]
async fn test_dispatch_command_sends_exact_list_to_host_only() {
    let server = start_server().await;
    let mut lobby = game_server(&server.addr, &["lobby"]).await;
    let mut survival = game_server(&server.addr, &["survival"]).await;

    let commands = vec![
        "say Restarting".to_owned(),
        "save-all".to_owned(),
        "whitelist on".to_owned(),
    ];
    let delivered = server
        .bridge
        .dispatch_command("survival", commands)
        .await
        .expect("known server");

    assert!(delivered);
    assert_eq!(
        recv_json(&mut survival).await,
        json!({
            "action": "dispatch-command",
            "server": "survival",
            "commands": ["say Restarting", "save-all", "whitelist on"],
        })
    );
    assert_silent(&mut survival).await;
    assert_silent(&mut lobby).await;
}

#[tokio::test]
async fn test_dispatch_command_single_command_stays_a_string() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["lobby"]).await;

    assert!(server.bridge.dispatch_command("lobby", "say hi").await.unwrap());

    assert_eq!(recv_json(&mut ws).await["commands"], "say hi");
}

#[tokio::test]
async fn test_dispatch_command_known_server_without_host_returns_false() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["survival"]).await;
    ws.close(None).await.unwrap();
    drop(ws);
    wait_for_clients(&server.bridge, 0).await;

    let result = server.bridge.dispatch_command("survival", "save-all").await;

    assert!(matches!(result, Ok(false)));
}

// =========================================================================
// Rewards
// =========================================================================

#[tokio::test]
async fn test_deliver_rewards_dispatches_and_clears() {
    let server = start_server().await;
    let mut ws = game_server(&server.addr, &["survival"]).await;
    report_online(&mut ws, "Steve", UUID).await;
    barrier(&mut ws, &["survival"]).await;

    let store = MemoryRewardStore::new();
    store
        .insert(
            42,
            RewardRecord::new(UUID)
                .with_rewards("survival", ["give {player} diamond 3", "xp add {player} 100"])
                .with_rewards("lobby", ["give {player} cookie 1"]),
        )
        .await;

    let delivered = server
        .bridge
        .deliver_rewards(&store, 42)
        .await
        .expect("store should not fail");

    assert!(delivered);
    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["action"], "dispatch-command");
    assert_eq!(
        frame["commands"],
        json!(["give {player} diamond 3", "xp add {player} 100"])
    );

    let record = store.get(42).await.unwrap();
    assert_eq!(record.pending_for("survival"), None);
    assert!(record.pending_for("lobby").is_some());
}

#[tokio::test]
async fn test_deliver_rewards_player_offline_keeps_rewards() {
    let server = start_server().await;
    let _ws = game_server(&server.addr, &["survival"]).await;

    let store = MemoryRewardStore::new();
    store
        .insert(7, RewardRecord::new(UUID).with_rewards("survival", ["give {player} apple 1"]))
        .await;

    let delivered = server.bridge.deliver_rewards(&store, 7).await.unwrap();

    assert!(!delivered);
    assert!(store.get(7).await.unwrap().pending_for("survival").is_some());
}

#[tokio::test]
async fn test_deliver_rewards_unknown_user_returns_false() {
    let server = start_server().await;
    let store = MemoryRewardStore::new();

    assert!(!server.bridge.deliver_rewards(&store, 1).await.unwrap());
}
