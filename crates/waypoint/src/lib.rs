//! # Waypoint
//!
//! Backend-initiated connection migration for game proxies.
//!
//! Backend servers ask the proxy to move one of their players by sending a
//! NUL-delimited plugin message (`1\0<username>\0<target>`) on the
//! `minibit:main` channel. Players can send themselves to the lobby with
//! the `lobby` command (alias `l`). Both paths share one decision: stay
//! put with a notice, complain that the server doesn't exist, or hand a
//! connection switch to the proxy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use waypoint::prelude::*;
//!
//! # async fn demo() -> Result<(), WaypointError> {
//! let config = WaypointConfig::load("waypoint.json")?;
//! waypoint::logging::init(&config.log)?;
//!
//! let (proxy, waypoint) = waypoint::start(config)?;
//! let alice = proxy.login("alice", "survival")?;
//!
//! let message = PluginMessage::from_backend("survival", ChannelId::default(), b"1\0alice\0lobby".to_vec());
//! waypoint.on_plugin_message(&message);
//! # drop(alice);
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod config;
mod error;
pub mod logging;
mod plugin;

pub use bootstrap::{start, start_proxy};
pub use config::{ConfigError, LobbyConfig, LogConfig, ServerConfig, WaypointConfig};
pub use error::WaypointError;
pub use plugin::{IgnoreReason, PluginMessageResult, ProxyEvent, Waypoint, WaypointBuilder};

pub use waypoint_migration as migration;
pub use waypoint_protocol as protocol;
pub use waypoint_proxy as proxy;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::{
        IgnoreReason, PluginMessageResult, ProxyEvent, Waypoint, WaypointConfig, WaypointError,
    };
    pub use waypoint_migration::{
        BackendReport, CommandOutcome, DropReason, MigrationOutcome,
    };
    pub use waypoint_protocol::{
        BackendMessage, ChannelId, MessageSource, Notice, PlayerName, PluginMessage, ServerName,
        TextColor,
    };
    pub use waypoint_proxy::{
        CommandSource, ConnectedPlayer, ConnectionEvent, KnownServer, Proxy, ProxyRuntime,
    };
}
