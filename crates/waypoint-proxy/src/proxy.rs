//! `Proxy`: an in-memory proxy runtime.
//!
//! Ties the [`Directory`] and the connector actor together behind the
//! [`ProxyRuntime`] trait. It has no network side at all: servers are
//! registered by name, players "log in" by calling [`Proxy::login`], and
//! notices land in per-player inboxes. That is exactly enough proxy to run
//! the migration core end to end.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use waypoint_protocol::{PlayerName, ServerName};

use crate::connector::{spawn_connector, ConnectionEvent, ConnectionRequest};
use crate::directory::{PlayerRef, ServerRef};
use crate::runtime::{Console, ConnectedPlayer, KnownServer, NoticeReceiver, ProxyRuntime};
use crate::{Directory, ProxyError};

/// Tunables for the in-memory proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// How many [`ConnectionEvent`]s a slow subscriber may fall behind
    /// before it starts missing events.
    pub event_capacity: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self { event_capacity: 256 }
    }
}

/// A successful login: the player's handle and their notice inbox.
#[derive(Debug)]
pub struct Login {
    pub player: PlayerRef,
    pub notices: NoticeReceiver,
}

/// The in-memory proxy. Cheap to clone; clones share all state.
///
/// Must be created inside a Tokio runtime, because it spawns the connector
/// task.
#[derive(Clone)]
pub struct Proxy {
    directory: Arc<Directory>,
    requests: mpsc::UnboundedSender<ConnectionRequest>,
    events: broadcast::Sender<ConnectionEvent>,
}

impl Proxy {
    /// Starts a proxy with default settings.
    pub fn start() -> Self {
        Self::with_config(ProxyConfig::default())
    }

    /// Starts a proxy with the given settings.
    pub fn with_config(config: ProxyConfig) -> Self {
        let directory = Arc::new(Directory::new());
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let requests = spawn_connector(Arc::clone(&directory), events.clone());

        Self {
            directory,
            requests,
            events,
        }
    }

    /// Read access to the directory, for inspection.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Registers a backend server.
    ///
    /// # Errors
    /// Returns [`ProxyError::ServerExists`] if the name is taken.
    pub fn register_server(
        &self,
        name: impl Into<ServerName>,
        address: impl Into<String>,
    ) -> Result<ServerRef, ProxyError> {
        self.directory.register_server(name.into(), address)
    }

    /// Removes a backend server.
    ///
    /// # Errors
    /// Returns [`ProxyError::ServerNotFound`] if no such server exists.
    pub fn unregister_server(&self, name: &str) -> Result<(), ProxyError> {
        self.directory.unregister_server(name)
    }

    /// Marks a server as accepting or refusing connections.
    ///
    /// # Errors
    /// Returns [`ProxyError::ServerNotFound`] if no such server exists.
    pub fn set_accepting(&self, name: &str, accepting: bool) -> Result<(), ProxyError> {
        self.directory.set_accepting(name, accepting)
    }

    /// Connects a player and attaches them to `server`.
    ///
    /// # Errors
    /// - [`ProxyError::ServerNotFound`] — `server` isn't registered
    /// - [`ProxyError::AlreadyConnected`] — the name is in use
    pub fn login(
        &self,
        name: impl Into<PlayerName>,
        server: &str,
    ) -> Result<Login, ProxyError> {
        let (player, notices) = self.directory.add_player(name.into(), server)?;
        Ok(Login { player, notices })
    }

    /// Disconnects a player.
    ///
    /// # Errors
    /// Returns [`ProxyError::PlayerNotFound`] if the player isn't connected.
    pub fn logout(&self, name: &str) -> Result<(), ProxyError> {
        self.directory.remove_player(name).map(|_| ())
    }

    /// A console command source and its inbox.
    pub fn console(&self) -> (Console, NoticeReceiver) {
        Console::new()
    }

    /// Subscribes to the outcomes of connection requests.
    ///
    /// Only events sent after subscribing are received.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }
}

impl ProxyRuntime for Proxy {
    type Player = PlayerRef;
    type Server = ServerRef;

    fn player_by_name(&self, username: &str) -> Option<PlayerRef> {
        self.directory.player(username)
    }

    fn server_by_name(&self, name: &str) -> Option<ServerRef> {
        self.directory.server(name)
    }

    fn connect(&self, player: &PlayerRef, target: &ServerRef) {
        let request = ConnectionRequest {
            player_id: player.id(),
            player: player.username().clone(),
            target: target.name().clone(),
        };

        if self.requests.send(request).is_err() {
            tracing::warn!(
                player = %player.username(),
                target = %target.name(),
                "connector is not running, connection request dropped"
            );
        }
    }
}
