//! Recording mock runtime for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use waypoint_protocol::{Notice, PlayerName, ServerName};
use waypoint_proxy::{
    Audience, ConnectedPlayer, KnownServer, ProxyError, ProxyRuntime,
};

#[derive(Debug, Default)]
struct Recorded {
    failing: HashSet<PlayerName>,
    notices: Vec<(PlayerName, Notice)>,
    connects: Vec<(PlayerName, ServerName)>,
    lookups: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct MockPlayer {
    name: PlayerName,
    current: Option<ServerName>,
    recorded: Arc<Mutex<Recorded>>,
}

impl Audience for MockPlayer {
    fn send_notice(&self, notice: Notice) -> Result<(), ProxyError> {
        let mut recorded = self.recorded.lock().unwrap();
        if recorded.failing.contains(&self.name) {
            return Err(ProxyError::Undeliverable(self.name.to_string()));
        }
        recorded.notices.push((self.name.clone(), notice));
        Ok(())
    }
}

impl ConnectedPlayer for MockPlayer {
    fn username(&self) -> &PlayerName {
        &self.name
    }

    fn current_server(&self) -> Option<&ServerName> {
        self.current.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MockServer(ServerName);

impl MockServer {
    pub(crate) fn named(name: &str) -> Self {
        Self(ServerName::from(name))
    }
}

impl KnownServer for MockServer {
    fn name(&self) -> &ServerName {
        &self.0
    }
}

pub(crate) struct MockRuntime {
    servers: Vec<ServerName>,
    players: Mutex<HashMap<PlayerName, MockPlayer>>,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockRuntime {
    pub(crate) fn new(servers: &[&str]) -> Self {
        Self {
            servers: servers.iter().map(|s| ServerName::from(*s)).collect(),
            players: Mutex::new(HashMap::new()),
            recorded: Arc::default(),
        }
    }

    pub(crate) fn add_player(&self, name: &str, current: Option<&str>) -> MockPlayer {
        let player = MockPlayer {
            name: PlayerName::from(name),
            current: current.map(ServerName::from),
            recorded: Arc::clone(&self.recorded),
        };
        self.players
            .lock()
            .unwrap()
            .insert(player.name.clone(), player.clone());
        player
    }

    pub(crate) fn fail_notices(&self, name: &str) {
        self.recorded.lock().unwrap().failing.insert(PlayerName::from(name));
    }

    pub(crate) fn notices(&self, name: &str) -> Vec<Notice> {
        self.recorded
            .lock()
            .unwrap()
            .notices
            .iter()
            .filter(|(player, _)| player == name)
            .map(|(_, notice)| notice.clone())
            .collect()
    }

    pub(crate) fn connects(&self) -> Vec<(PlayerName, ServerName)> {
        self.recorded.lock().unwrap().connects.clone()
    }

    pub(crate) fn server_lookups(&self) -> Vec<String> {
        self.recorded.lock().unwrap().lookups.clone()
    }
}

impl ProxyRuntime for MockRuntime {
    type Player = MockPlayer;
    type Server = MockServer;

    fn player_by_name(&self, username: &str) -> Option<MockPlayer> {
        self.players.lock().unwrap().get(username).cloned()
    }

    fn server_by_name(&self, name: &str) -> Option<MockServer> {
        self.recorded.lock().unwrap().lookups.push(name.to_owned());
        self.servers
            .iter()
            .find(|server| server.as_str() == name)
            .map(|server| MockServer(server.clone()))
    }

    fn connect(&self, player: &MockPlayer, target: &MockServer) {
        self.recorded
            .lock()
            .unwrap()
            .connects
            .push((player.name.clone(), target.0.clone()));
    }
}
