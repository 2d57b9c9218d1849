//! The player and server directory: who is connected, and where.
//!
//! The directory is the proxy's source of truth for lookups. It's read on
//! every plugin message and every command, from whichever task is handling
//! it, so it uses concurrent maps (`DashMap`) rather than a map behind one
//! big lock. A lookup never awaits and never waits on I/O.
//!
//! # Handles are snapshots
//!
//! [`Directory::player`] and [`Directory::server`] return small owned
//! handles ([`PlayerRef`], [`ServerRef`]) copied out of the maps. Holding a
//! handle does not hold a map shard lock, and a handle does not track later
//! changes. Callers use one for a single request and look up again next
//! time.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use waypoint_protocol::{Notice, PlayerId, PlayerName, ServerName};

use crate::runtime::{Audience, ConnectedPlayer, KnownServer, NoticeReceiver, NoticeSender};
use crate::ProxyError;

/// Per-player state kept by the directory.
#[derive(Debug)]
struct PlayerEntry {
    id: PlayerId,
    current_server: Option<ServerName>,
    outbox: NoticeSender,
}

/// Per-server state kept by the directory.
#[derive(Debug)]
struct ServerEntry {
    address: String,
    /// Cleared to simulate a server that is registered but refusing logins
    /// (restarting, full, whitelisted).
    accepting: bool,
}

/// Registry of connected players and registered backend servers.
#[derive(Debug, Default)]
pub struct Directory {
    players: DashMap<PlayerName, PlayerEntry>,
    servers: DashMap<ServerName, ServerEntry>,
    next_player_id: AtomicU64,
}

impl Directory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    // -- Servers ----------------------------------------------------------

    /// Registers a backend server.
    ///
    /// # Errors
    /// Returns [`ProxyError::ServerExists`] if the name is taken.
    pub fn register_server(
        &self,
        name: ServerName,
        address: impl Into<String>,
    ) -> Result<ServerRef, ProxyError> {
        match self.servers.entry(name) {
            Entry::Occupied(occupied) => {
                Err(ProxyError::ServerExists(occupied.key().clone()))
            }
            Entry::Vacant(vacant) => {
                let address = address.into();
                let server = ServerRef {
                    name: vacant.key().clone(),
                    address: address.clone(),
                };
                vacant.insert(ServerEntry {
                    address,
                    accepting: true,
                });
                tracing::info!(server = %server.name, address = %server.address, "server registered");
                Ok(server)
            }
        }
    }

    /// Removes a backend server from the directory.
    ///
    /// Players currently on it keep their `current_server` until they move;
    /// the directory doesn't model backend disconnects.
    ///
    /// # Errors
    /// Returns [`ProxyError::ServerNotFound`] if no such server exists.
    pub fn unregister_server(&self, name: &str) -> Result<(), ProxyError> {
        self.servers
            .remove(name)
            .map(|(name, _)| tracing::info!(server = %name, "server unregistered"))
            .ok_or_else(|| ProxyError::ServerNotFound(name.into()))
    }

    /// Marks a server as accepting or refusing new connections.
    ///
    /// # Errors
    /// Returns [`ProxyError::ServerNotFound`] if no such server exists.
    pub fn set_accepting(
        &self,
        name: &str,
        accepting: bool,
    ) -> Result<(), ProxyError> {
        let mut entry = self
            .servers
            .get_mut(name)
            .ok_or_else(|| ProxyError::ServerNotFound(name.into()))?;
        entry.accepting = accepting;
        tracing::debug!(server = name, accepting, "server availability changed");
        Ok(())
    }

    /// Looks up a registered server.
    pub fn server(&self, name: &str) -> Option<ServerRef> {
        self.servers.get(name).map(|entry| ServerRef {
            name: entry.key().clone(),
            address: entry.address.clone(),
        })
    }

    /// `Some(accepting)` for a registered server, `None` otherwise.
    pub(crate) fn is_accepting(&self, name: &str) -> Option<bool> {
        self.servers.get(name).map(|entry| entry.accepting)
    }

    /// Number of registered servers.
    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    // -- Players ----------------------------------------------------------

    /// Adds a connected player attached to `server`.
    ///
    /// Returns the player's handle and the inbox their notices land in.
    ///
    /// # Errors
    /// - [`ProxyError::ServerNotFound`] — `server` isn't registered
    /// - [`ProxyError::AlreadyConnected`] — the name is in use
    pub fn add_player(
        &self,
        name: PlayerName,
        server: &str,
    ) -> Result<(PlayerRef, NoticeReceiver), ProxyError> {
        let server = self
            .servers
            .get(server)
            .map(|entry| entry.key().clone())
            .ok_or_else(|| ProxyError::ServerNotFound(server.into()))?;

        match self.players.entry(name) {
            Entry::Occupied(occupied) => {
                Err(ProxyError::AlreadyConnected(occupied.key().clone()))
            }
            Entry::Vacant(vacant) => {
                let id = PlayerId(self.next_player_id.fetch_add(1, Ordering::Relaxed) + 1);
                let (outbox, inbox) = mpsc::unbounded_channel();
                let player = PlayerRef {
                    id,
                    name: vacant.key().clone(),
                    current_server: Some(server.clone()),
                    outbox: outbox.clone(),
                };
                vacant.insert(PlayerEntry {
                    id,
                    current_server: Some(server),
                    outbox,
                });
                tracing::info!(player = %player.name, player_id = %id, "player connected");
                Ok((player, inbox))
            }
        }
    }

    /// Removes a connected player.
    ///
    /// # Errors
    /// Returns [`ProxyError::PlayerNotFound`] if the player isn't connected.
    pub fn remove_player(&self, name: &str) -> Result<PlayerId, ProxyError> {
        let (name, entry) = self
            .players
            .remove(name)
            .ok_or_else(|| ProxyError::PlayerNotFound(name.into()))?;
        tracing::info!(player = %name, player_id = %entry.id, "player disconnected");
        Ok(entry.id)
    }

    /// Looks up a connected player.
    pub fn player(&self, name: &str) -> Option<PlayerRef> {
        self.players.get(name).map(|entry| PlayerRef {
            id: entry.id,
            name: entry.key().clone(),
            current_server: entry.current_server.clone(),
            outbox: entry.outbox.clone(),
        })
    }

    /// Moves a player to `target`, returning the server they left.
    ///
    /// Only applies if the player with this name still has the id `id`;
    /// returns `None` if they left (or left and came back) in the meantime.
    pub(crate) fn move_player(
        &self,
        id: PlayerId,
        name: &str,
        target: &ServerName,
    ) -> Option<Option<ServerName>> {
        let mut entry = self.players.get_mut(name)?;
        if entry.id != id {
            return None;
        }
        Some(entry.current_server.replace(target.clone()))
    }

    /// Names of the players currently attached to `server`, sorted.
    pub fn players_on(&self, server: &str) -> Vec<PlayerName> {
        let mut names: Vec<PlayerName> = self
            .players
            .iter()
            .filter(|entry| {
                entry
                    .current_server
                    .as_ref()
                    .is_some_and(|current| current == server)
            })
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Number of connected players.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Snapshot handle to a connected player.
#[derive(Debug, Clone)]
pub struct PlayerRef {
    id: PlayerId,
    name: PlayerName,
    current_server: Option<ServerName>,
    outbox: NoticeSender,
}

impl PlayerRef {
    /// The id the player was given at login.
    pub fn id(&self) -> PlayerId {
        self.id
    }
}

impl Audience for PlayerRef {
    fn send_notice(&self, notice: Notice) -> Result<(), ProxyError> {
        self.outbox
            .send(notice)
            .map_err(|_| ProxyError::Undeliverable(self.name.to_string()))
    }
}

impl ConnectedPlayer for PlayerRef {
    fn username(&self) -> &PlayerName {
        &self.name
    }

    fn current_server(&self) -> Option<&ServerName> {
        self.current_server.as_ref()
    }
}

/// Snapshot handle to a registered server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRef {
    name: ServerName,
    address: String,
}

impl ServerRef {
    /// The address the server was registered with.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl KnownServer for ServerRef {
    fn name(&self) -> &ServerName {
        &self.name
    }
}

// =========================================================================
// Tests
// =========================================================================
