//! The collaborator interfaces the migration core consumes.
//!
//! Waypoint doesn't own players, servers or connections. The proxy does.
//! These traits describe the handful of things the migration core needs to
//! ask the proxy for:
//!
//! - find a connected player by username ([`ProxyRuntime::player_by_name`])
//! - find a registered server by name ([`ProxyRuntime::server_by_name`])
//! - read a player's current server ([`ConnectedPlayer::current_server`])
//! - start a connection switch ([`ProxyRuntime::connect`])
//! - send a chat notice ([`Audience::send_notice`])
//!
//! The in-memory [`Proxy`](crate::Proxy) implements them for tests and
//! demos; a real proxy integration implements them over its own state.

use std::fmt;

use tokio::sync::mpsc;
use waypoint_protocol::{Notice, PlayerName, ServerName};

use crate::ProxyError;

/// Sending half of a notice inbox.
pub type NoticeSender = mpsc::UnboundedSender<Notice>;

/// Receiving half of a notice inbox.
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Something that can be sent a chat notice.
pub trait Audience {
    /// Delivers `notice`, or fails if the recipient can't be reached.
    ///
    /// Must not block. Callers in the migration core treat a failure as
    /// "nobody was listening" and move on.
    fn send_notice(&self, notice: Notice) -> Result<(), ProxyError>;
}

/// A handle to a connected player, as returned by a directory lookup.
///
/// Handles are snapshots. Hold one for the duration of a single request and
/// then drop it; looking the player up again is cheap and always current.
pub trait ConnectedPlayer: Audience + Clone + fmt::Debug + Send + Sync {
    /// The player's username.
    fn username(&self) -> &PlayerName;

    /// The backend server the player is attached to, if any.
    ///
    /// `None` while the player is still logging in or between servers.
    fn current_server(&self) -> Option<&ServerName>;
}

/// A handle to a registered backend server.
pub trait KnownServer: Clone + fmt::Debug + Send + Sync {
    /// The name the server is registered under.
    fn name(&self) -> &ServerName;
}

/// The proxy, as seen from the migration core.
///
/// All methods are synchronous and must not wait on network I/O.
pub trait ProxyRuntime: Send + Sync + 'static {
    /// Handle type for connected players.
    type Player: ConnectedPlayer;

    /// Handle type for registered servers.
    type Server: KnownServer;

    /// Looks up a connected player. `None` is a normal answer.
    fn player_by_name(&self, username: &str) -> Option<Self::Player>;

    /// Looks up a registered server. `None` is a normal answer.
    fn server_by_name(&self, name: &str) -> Option<Self::Server>;

    /// Asks the proxy to move `player` to `target`.
    ///
    /// Fire-and-forget: this hands the request over and returns at once.
    /// Whether the destination handshake later succeeds is reported by the
    /// proxy on its own channels (to the player, and to whoever watches the
    /// proxy), never back to the caller.
    fn connect(&self, player: &Self::Player, target: &Self::Server);
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// The proxy operator's console, a non-player command source.
#[derive(Debug, Clone)]
pub struct Console {
    outbox: NoticeSender,
}

impl Console {
    /// Creates a console audience and the inbox its notices land in.
    pub fn new() -> (Self, NoticeReceiver) {
        let (outbox, inbox) = mpsc::unbounded_channel();
        (Self { outbox }, inbox)
    }
}

impl Audience for Console {
    fn send_notice(&self, notice: Notice) -> Result<(), ProxyError> {
        self.outbox
            .send(notice)
            .map_err(|_| ProxyError::Undeliverable("console".into()))
    }
}

// ---------------------------------------------------------------------------
// CommandSource
// ---------------------------------------------------------------------------

/// Whoever invoked a command.
///
/// Commands that only make sense for players narrow the source once with
/// [`as_player`](Self::as_player) and reject everything else.
#[derive(Debug, Clone)]
pub enum CommandSource<P> {
    /// A connected player typed the command.
    Player(P),
    /// The operator typed it on the console.
    Console(Console),
}

impl<P: ConnectedPlayer> CommandSource<P> {
    /// Returns the player handle if the source is a player.
    pub fn as_player(&self) -> Option<&P> {
        match self {
            Self::Player(player) => Some(player),
            Self::Console(_) => None,
        }
    }

    /// A short label for logs.
    pub fn label(&self) -> String {
        match self {
            Self::Player(player) => player.username().to_string(),
            Self::Console(_) => "console".to_owned(),
        }
    }
}

impl<P: ConnectedPlayer> Audience for CommandSource<P> {
    fn send_notice(&self, notice: Notice) -> Result<(), ProxyError> {
        match self {
            Self::Player(player) => player.send_notice(notice),
            Self::Console(console) => console.send_notice(notice),
        }
    }
}
