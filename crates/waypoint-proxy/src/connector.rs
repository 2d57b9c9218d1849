//! Connector actor: performs the connection switches that
//! [`ProxyRuntime::connect`](crate::ProxyRuntime::connect) hands off.
//!
//! The connector is a single Tokio task that owns nothing but a reference
//! to the directory. Callers push [`ConnectionRequest`]s into an unbounded
//! channel (a synchronous, non-blocking send) and walk away. The task works
//! through them in arrival order and reports each result twice:
//!
//! - to the player, as an indication notice, when the switch fails;
//! - to anyone subscribed, as a [`ConnectionEvent`] on a broadcast channel.
//!
//! Requests are not deduplicated. Two requests to the same server for the
//! same player produce one `Connected` and one `Failed(AlreadyConnected)`.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use waypoint_protocol::{Notice, PlayerId, PlayerName, ServerName, TextColor};

use crate::runtime::{Audience, ConnectedPlayer};
use crate::Directory;

/// Indication sent when the player is already on the requested server.
pub const ALREADY_CONNECTED_INDICATION: &str =
    "You are already connected to this server!";

/// One queued connection switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub player_id: PlayerId,
    pub player: PlayerName,
    pub target: ServerName,
}

/// Why a connection switch didn't happen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectFailure {
    /// The player disconnected before the request was processed.
    #[error("player is no longer connected")]
    PlayerGone,

    /// The player was already on the target when the request ran.
    #[error("already connected to {0}")]
    AlreadyConnected(ServerName),

    /// The target was unregistered before the request ran.
    #[error("server {0} is not registered")]
    ServerNotFound(ServerName),

    /// The target is registered but refusing connections.
    #[error("server {0} is not accepting players")]
    NotAccepting(ServerName),
}

/// Result of a processed [`ConnectionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The player now sits on `to`.
    Connected {
        player: PlayerName,
        from: Option<ServerName>,
        to: ServerName,
    },

    /// The switch was refused; the player stays where they were.
    Failed {
        player: PlayerName,
        target: ServerName,
        reason: ConnectFailure,
    },
}

struct Connector {
    directory: Arc<Directory>,
    requests: mpsc::UnboundedReceiver<ConnectionRequest>,
    events: broadcast::Sender<ConnectionEvent>,
}

impl Connector {
    async fn run(mut self) {
        tracing::debug!("connector started");

        while let Some(request) = self.requests.recv().await {
            self.process(request);
        }

        tracing::debug!("connector stopped");
    }

    fn process(&self, request: ConnectionRequest) {
        let event = match self.attempt(&request) {
            Ok(from) => {
                tracing::info!(
                    player = %request.player,
                    from = ?from.as_ref().map(ServerName::as_str),
                    to = %request.target,
                    "player switched servers"
                );
                ConnectionEvent::Connected {
                    player: request.player,
                    from,
                    to: request.target,
                }
            }
            Err(reason) => {
                tracing::warn!(
                    player = %request.player,
                    target = %request.target,
                    %reason,
                    "connection request failed"
                );
                self.indicate(&request, &reason);
                ConnectionEvent::Failed {
                    player: request.player,
                    target: request.target,
                    reason,
                }
            }
        };

        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn attempt(
        &self,
        request: &ConnectionRequest,
    ) -> Result<Option<ServerName>, ConnectFailure> {
        let player = self
            .directory
            .player(request.player.as_str())
            .filter(|player| player.id() == request.player_id)
            .ok_or(ConnectFailure::PlayerGone)?;

        if player.current_server() == Some(&request.target) {
            return Err(ConnectFailure::AlreadyConnected(request.target.clone()));
        }

        match self.directory.is_accepting(request.target.as_str()) {
            None => {
                return Err(ConnectFailure::ServerNotFound(request.target.clone()));
            }
            Some(false) => {
                return Err(ConnectFailure::NotAccepting(request.target.clone()));
            }
            Some(true) => {}
        }

        self.directory
            .move_player(request.player_id, request.player.as_str(), &request.target)
            .ok_or(ConnectFailure::PlayerGone)
    }

    /// Tells the player why their switch failed. Best effort.
    fn indicate(&self, request: &ConnectionRequest, reason: &ConnectFailure) {
        let text = match reason {
            ConnectFailure::PlayerGone => return,
            ConnectFailure::AlreadyConnected(_) => {
                ALREADY_CONNECTED_INDICATION.to_owned()
            }
            ConnectFailure::ServerNotFound(target)
            | ConnectFailure::NotAccepting(target) => {
                format!("Unable to connect to {target}. Try again later.")
            }
        };

        if let Some(player) = self.directory.player(request.player.as_str()) {
            let _ = player.send_notice(Notice::colored(text, TextColor::Red));
        }
    }
}

/// Spawns the connector task and returns the sender requests go into.
///
/// The task runs until every sender has been dropped.
pub(crate) fn spawn_connector(
    directory: Arc<Directory>,
    events: broadcast::Sender<ConnectionEvent>,
) -> mpsc::UnboundedSender<ConnectionRequest> {
    let (tx, rx) = mpsc::unbounded_channel();

    let connector = Connector {
        directory,
        requests: rx,
        events,
    };

    tokio::spawn(connector.run());

    tx
}
