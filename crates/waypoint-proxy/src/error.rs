//! Error types for the proxy runtime.

use waypoint_protocol::{PlayerName, ServerName};

/// Errors raised by the proxy runtime's own bookkeeping.
///
/// The migration core only ever sees [`ProxyError::Undeliverable`] (from
/// sending a notice), and it swallows that one. The other variants come
/// from registering servers and logging players in and out, which belong
/// to whoever drives the proxy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    /// No connected player has this name.
    #[error("player {0} is not connected")]
    PlayerNotFound(PlayerName),

    /// A player with this name is already connected.
    #[error("player {0} is already connected")]
    AlreadyConnected(PlayerName),

    /// No backend server is registered under this name.
    #[error("server {0} is not registered")]
    ServerNotFound(ServerName),

    /// A backend server is already registered under this name.
    #[error("server {0} is already registered")]
    ServerExists(ServerName),

    /// The recipient's notice inbox is gone, usually because the player
    /// disconnected between lookup and send.
    #[error("could not deliver notice to {0}")]
    Undeliverable(String),
}
