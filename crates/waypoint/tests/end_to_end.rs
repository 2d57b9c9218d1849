//! End-to-end tests: plugin facade on top of the in-memory proxy.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;
use waypoint::prelude::*;
use waypoint::{start, ServerConfig};
use waypoint_migration::notices::{ALREADY_IN_SERVER, PLAYER_ONLY, SERVER_NOT_FOUND};
use waypoint_proxy::{Console, Login, PlayerRef};

// =========================================================================
// Helpers
// =========================================================================

/// lobby and survival registered; alice on lobby, bob on survival.
struct Network {
    proxy: Arc<Proxy>,
    waypoint: Waypoint<Proxy>,
    events: broadcast::Receiver<ConnectionEvent>,
    alice: Login,
    bob: Login,
}

fn network() -> Network {
    let config = WaypointConfig {
        servers: vec![
            ServerConfig {
                name: "lobby".into(),
                address: "10.0.0.1:25565".into(),
                accepting: true,
            },
            ServerConfig {
                name: "survival".into(),
                address: "10.0.0.2:25565".into(),
                accepting: true,
            },
        ],
        ..WaypointConfig::default()
    };

    let (proxy, waypoint) = start(config).unwrap();
    let events = proxy.subscribe();
    let alice = proxy.login("alice", "lobby").unwrap();
    let bob = proxy.login("bob", "survival").unwrap();

    Network {
        proxy,
        waypoint,
        events,
        alice,
        bob,
    }
}

fn backend_message(from: &str, payload: &[u8]) -> PluginMessage {
    PluginMessage::from_backend(from, ChannelId::default(), payload.to_vec())
}

async fn next_event(events: &mut broadcast::Receiver<ConnectionEvent>) -> ConnectionEvent {
    timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out waiting for a connection event")
        .expect("event channel closed")
}

/// Asserts nothing reaches the connector within a short window.
async fn assert_no_event(events: &mut broadcast::Receiver<ConnectionEvent>) {
    let result = timeout(Duration::from_millis(100), events.recv()).await;
    assert!(result.is_err(), "unexpected connection event: {result:?}");
}

fn current_server(proxy: &Proxy, name: &str) -> Option<String> {
    proxy
        .player_by_name(name)
        .and_then(|player| player.current_server().map(ToString::to_string))
}

fn player_source(player: &PlayerRef) -> CommandSource<PlayerRef> {
    CommandSource::Player(player.clone())
}

// =========================================================================
// Backend path
// =========================================================================

#[tokio::test]
async fn test_backend_request_moves_player_without_notice() {
    let mut net = network();

    let result = net
        .waypoint
        .on_plugin_message(&backend_message("lobby", b"1\0alice\0survival"));

    assert!(matches!(
        result,
        PluginMessageResult::Handled(BackendReport::Migration(MigrationOutcome::MigrationIssued { .. }))
    ));
    assert_eq!(
        next_event(&mut net.events).await,
        ConnectionEvent::Connected {
            player: "alice".into(),
            from: Some("lobby".into()),
            to: "survival".into(),
        }
    );
    assert_eq!(current_server(&net.proxy, "alice").as_deref(), Some("survival"));
    assert!(net.alice.notices.try_recv().is_err());
}

#[tokio::test]
async fn test_backend_request_for_current_server_sends_notice() {
    let mut net = network();

    net.waypoint
        .on_plugin_message(&backend_message("lobby", b"1\0alice\0lobby"));

    assert_eq!(
        net.alice.notices.try_recv().unwrap(),
        Notice::plain(ALREADY_IN_SERVER)
    );
    assert_no_event(&mut net.events).await;
}

#[tokio::test]
async fn test_backend_request_for_unknown_server_sends_notice() {
    let mut net = network();

    net.waypoint
        .on_plugin_message(&backend_message("lobby", b"1\0alice\0atlantis"));

    assert_eq!(
        net.alice.notices.try_recv().unwrap(),
        Notice::plain(SERVER_NOT_FOUND)
    );
    assert!(net.alice.notices.try_recv().is_err());
    assert_no_event(&mut net.events).await;
}

#[tokio::test]
async fn test_backend_request_for_offline_player_is_noop() {
    let mut net = network();

    let result = net
        .waypoint
        .on_plugin_message(&backend_message("lobby", b"1\0ghost\0survival"));

    assert!(matches!(
        result,
        PluginMessageResult::Handled(BackendReport::Dropped(DropReason::PlayerOffline(_)))
    ));
    assert!(net.alice.notices.try_recv().is_err());
    assert!(net.bob.notices.try_recv().is_err());
    assert_no_event(&mut net.events).await;
}

#[tokio::test]
async fn test_backend_malformed_message_is_dropped() {
    let mut net = network();

    let result = net
        .waypoint
        .on_plugin_message(&backend_message("lobby", b"one\0alice\0survival"));

    assert!(matches!(
        result,
        PluginMessageResult::Handled(BackendReport::Dropped(DropReason::Malformed(_)))
    ));
    assert!(net.alice.notices.try_recv().is_err());
    assert_no_event(&mut net.events).await;
}

#[tokio::test]
async fn test_plugin_message_from_player_is_ignored() {
    let mut net = network();
    let message = PluginMessage::from_player("alice", ChannelId::default(), b"1\0alice\0survival".to_vec());

    let result = net.waypoint.on_plugin_message(&message);

    assert_eq!(result, PluginMessageResult::Ignored(IgnoreReason::NotFromBackend));
    assert_no_event(&mut net.events).await;
    assert_eq!(current_server(&net.proxy, "alice").as_deref(), Some("lobby"));
}

#[tokio::test]
async fn test_plugin_message_on_other_channel_is_ignored() {
    let mut net = network();
    let channel: ChannelId = "other:channel".parse().unwrap();
    let message = PluginMessage::from_backend("lobby", channel, b"1\0alice\0survival".to_vec());

    let result = net.waypoint.on_plugin_message(&message);

    assert_eq!(result, PluginMessageResult::Ignored(IgnoreReason::OtherChannel));
    assert_no_event(&mut net.events).await;
}

#[tokio::test]
async fn test_backend_request_to_closed_server_reports_failure_on_runtime_channel() {
    let mut net = network();
    net.proxy.set_accepting("survival", false).unwrap();

    let result = net
        .waypoint
        .on_plugin_message(&backend_message("lobby", b"1\0alice\0survival"));

    // The core only knows it issued the switch; the proxy reports the rest.
    assert!(matches!(
        result,
        PluginMessageResult::Handled(BackendReport::Migration(MigrationOutcome::MigrationIssued { .. }))
    ));
    assert!(matches!(
        next_event(&mut net.events).await,
        ConnectionEvent::Failed { .. }
    ));
    let notice = net.alice.notices.recv().await.unwrap();
    assert_eq!(notice.color, Some(TextColor::Red));
    assert_eq!(current_server(&net.proxy, "alice").as_deref(), Some("lobby"));
}

// =========================================================================
// Command path
// =========================================================================

#[tokio::test]
async fn test_console_lobby_command_is_refused() {
    let mut net = network();
    let (console, mut inbox) = Console::new();

    let outcome = net
        .waypoint
        .execute_command(&CommandSource::Console(console), "lobby")
        .unwrap();

    assert_eq!(outcome, CommandOutcome::NotAPlayer);
    assert_eq!(
        inbox.try_recv().unwrap(),
        Notice::colored(PLAYER_ONLY, TextColor::Red)
    );
    assert_no_event(&mut net.events).await;
}

#[tokio::test]
async fn test_player_lobby_command_moves_player_to_lobby() {
    let mut net = network();

    let outcome = net
        .waypoint
        .execute_command(&player_source(&net.bob.player), "/l")
        .unwrap();

    assert!(matches!(
        outcome,
        CommandOutcome::Migration(MigrationOutcome::MigrationIssued { .. })
    ));
    assert!(matches!(
        next_event(&mut net.events).await,
        ConnectionEvent::Connected { ref to, .. } if to.as_str() == "lobby"
    ));
    assert_eq!(current_server(&net.proxy, "bob").as_deref(), Some("lobby"));
}

#[tokio::test]
async fn test_player_lobby_command_in_lobby_sends_red_notice() {
    let mut net = network();

    net.waypoint
        .execute_command(&player_source(&net.alice.player), "lobby")
        .unwrap();

    assert_eq!(
        net.alice.notices.try_recv().unwrap(),
        Notice::colored(ALREADY_IN_SERVER, TextColor::Red)
    );
    assert_no_event(&mut net.events).await;
}

#[tokio::test]
async fn test_unknown_command_returns_command_error() {
    let net = network();

    let result = net
        .waypoint
        .execute_command(&player_source(&net.bob.player), "hub");

    assert!(matches!(result, Err(WaypointError::Command(_))));
}

// =========================================================================
// Event loop
// =========================================================================

#[tokio::test]
async fn test_run_handles_events_until_channel_closes() {
    let mut net = network();
    let (tx, rx) = mpsc::channel(8);

    tx.send(ProxyEvent::PluginMessage(backend_message("lobby", b"1\0alice\0survival")))
        .await
        .unwrap();
    tx.send(ProxyEvent::Command {
        source: player_source(&net.bob.player),
        input: "not-a-command".into(),
    })
    .await
    .unwrap();
    tx.send(ProxyEvent::Command {
        source: player_source(&net.bob.player),
        input: "lobby".into(),
    })
    .await
    .unwrap();
    drop(tx);

    net.waypoint.run(rx).await;

    let mut moved = Vec::new();
    for _ in 0..2 {
        if let ConnectionEvent::Connected { player, to, .. } = next_event(&mut net.events).await {
            moved.push((player.to_string(), to.to_string()));
        }
    }
    moved.sort();
    assert_eq!(
        moved,
        vec![
            ("alice".to_owned(), "survival".to_owned()),
            ("bob".to_owned(), "lobby".to_owned()),
        ]
    );
}

#[tokio::test]
async fn test_builder_overrides_lobby_and_channel() {
    let net = network();
    let channel: ChannelId = "network:switch".parse().unwrap();

    let waypoint = Waypoint::builder(Arc::clone(&net.proxy))
        .lobby("survival")
        .aliases(["hub"])
        .channel(&channel)
        .build()
        .unwrap();

    assert_eq!(waypoint.lobby().as_str(), "survival");
    assert_eq!(waypoint.channel(), &channel);
    assert_eq!(waypoint.command_names().collect::<Vec<_>>(), vec!["lobby", "hub"]);
}

#[tokio::test]
async fn test_builder_rejects_empty_lobby() {
    let net = network();

    let result = Waypoint::builder(Arc::clone(&net.proxy)).lobby("").build();

    assert!(matches!(result, Err(WaypointError::Config(_))));
}
