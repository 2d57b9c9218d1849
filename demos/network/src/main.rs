use tokio::sync::{broadcast, mpsc};
use waypoint::prelude::*;
use waypoint::proxy::{Console, NoticeReceiver, PlayerRef};

// ---------------------------------------------------------------------------
// Network layout
// ---------------------------------------------------------------------------

const CONFIG: &str = r#"{
    "channel": "minibit:main",
    "lobby": { "server": "lobby", "aliases": ["l"] },
    "servers": [
        { "name": "lobby", "address": "127.0.0.1:25566" },
        { "name": "survival", "address": "127.0.0.1:25567" },
        { "name": "creative", "address": "127.0.0.1:25568", "accepting": false }
    ],
    "log": { "filter": "info,waypoint_migration=debug" }
}"#;

/// Loads the config from the first CLI argument, or the built-in layout.
fn load_config() -> Result<WaypointConfig, WaypointError> {
    match std::env::args().nth(1) {
        Some(path) => Ok(WaypointConfig::load(path)?),
        None => Ok(WaypointConfig::from_json_str(CONFIG)?),
    }
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

fn backend(from: &str, username: &str, target: &str) -> ProxyEvent<PlayerRef> {
    let data = BackendMessage::switch_server(username, target)
        .encode()
        .unwrap_or_default();
    ProxyEvent::PluginMessage(PluginMessage::from_backend(from, ChannelId::default(), data))
}

fn command(source: CommandSource<PlayerRef>, input: &str) -> ProxyEvent<PlayerRef> {
    ProxyEvent::Command {
        source,
        input: input.to_owned(),
    }
}

/// Requests sent by backend servers. Two of them reach the connector.
fn backend_script() -> Vec<ProxyEvent<PlayerRef>> {
    vec![
        // lobby sends alice to survival
        backend("lobby", "alice", "survival"),
        // bob is already in the lobby
        backend("lobby", "bob", "lobby"),
        // nobody runs atlantis
        backend("lobby", "bob", "atlantis"),
        // ghost isn't online
        backend("lobby", "ghost", "survival"),
        // creative is registered but closed
        backend("lobby", "bob", "creative"),
        // a client spoofing a backend message
        ProxyEvent::PluginMessage(PluginMessage::from_player(
            "bob",
            ChannelId::default(),
            b"1\0bob\0survival".to_vec(),
        )),
    ]
}

/// Commands typed on the proxy. One of them reaches the connector.
fn command_script(proxy: &Proxy, console: Console) -> Vec<ProxyEvent<PlayerRef>> {
    let mut events = vec![command(CommandSource::Console(console), "lobby")];
    if let Some(alice) = proxy.player_by_name("alice") {
        events.push(command(CommandSource::Player(alice), "/l"));
    }
    if let Some(bob) = proxy.player_by_name("bob") {
        events.push(command(CommandSource::Player(bob), "lobby now"));
    }
    events
}

/// Feeds `events` through the plugin's event loop, then prints the
/// `switches` connection results they produce.
async fn play(
    waypoint: &Waypoint<Proxy>,
    connections: &mut broadcast::Receiver<ConnectionEvent>,
    events: Vec<ProxyEvent<PlayerRef>>,
    switches: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = mpsc::channel(events.len().max(1));
    for event in events {
        tx.send(event).await?;
    }
    drop(tx);

    waypoint.run(rx).await;

    for _ in 0..switches {
        match connections.recv().await? {
            ConnectionEvent::Connected { player, from, to } => {
                let from = from.map(|s| s.to_string()).unwrap_or_else(|| "-".into());
                println!("  {player}: {from} -> {to}");
            }
            ConnectionEvent::Failed { player, target, reason } => {
                println!("  {player}: {target} failed ({reason})");
            }
        }
    }

    Ok(())
}

fn print_notices(label: &str, inbox: &mut NoticeReceiver) {
    while let Ok(notice) = inbox.try_recv() {
        match notice.color {
            Some(color) => println!("  [{label}] ({color:?}) {notice}"),
            None => println!("  [{label}] {notice}"),
        }
    }
}

fn report(proxy: &Proxy) {
    println!("where everyone is:");
    for server in ["lobby", "survival", "creative"] {
        let names: Vec<String> = proxy
            .directory()
            .players_on(server)
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("  {server}: {}", names.join(", "));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    waypoint::logging::init(&config.log)?;

    let (proxy, waypoint) = waypoint::start(config)?;
    let mut connections = proxy.subscribe();

    let mut alice = proxy.login("alice", "lobby")?;
    let mut bob = proxy.login("bob", "lobby")?;
    let (console, mut console_inbox) = proxy.console();
    tracing::info!(
        servers = proxy.directory().server_count(),
        players = proxy.directory().player_count(),
        "demo network up"
    );

    println!("backend requests:");
    play(&waypoint, &mut connections, backend_script(), 2).await?;

    println!("commands:");
    let commands = command_script(&proxy, console);
    play(&waypoint, &mut connections, commands, 1).await?;

    println!("notices:");
    print_notices("alice", &mut alice.notices);
    print_notices("bob", &mut bob.notices);
    print_notices("console", &mut console_inbox);

    report(&proxy);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config_is_valid() {
        let config = WaypointConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(config.servers.len(), 3);
        assert!(!config.servers[2].accepting);
    }

    #[tokio::test]
    async fn test_scripts_end_with_everyone_in_lobby() {
        let config = WaypointConfig::from_json_str(CONFIG).unwrap();
        let (proxy, waypoint) = waypoint::start(config).unwrap();
        let mut connections = proxy.subscribe();
        let _alice = proxy.login("alice", "lobby").unwrap();
        let _bob = proxy.login("bob", "lobby").unwrap();
        let (console, _inbox) = proxy.console();

        play(&waypoint, &mut connections, backend_script(), 2).await.unwrap();
        let alice = proxy.player_by_name("alice").unwrap();
        assert_eq!(alice.current_server().map(ServerName::as_str), Some("survival"));

        let commands = command_script(&proxy, console);
        play(&waypoint, &mut connections, commands, 1).await.unwrap();

        assert_eq!(proxy.directory().players_on("lobby").len(), 2);
        assert!(proxy.directory().players_on("creative").is_empty());
    }
}
