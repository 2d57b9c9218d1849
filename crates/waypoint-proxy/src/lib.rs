//! Proxy runtime for Waypoint.
//!
//! This crate has two halves:
//!
//! 1. **Interfaces** ([`ProxyRuntime`], [`ConnectedPlayer`],
//!    [`KnownServer`], [`Audience`], [`CommandSource`]) — what the
//!    migration core needs from a proxy, and nothing more.
//! 2. **An in-memory proxy** ([`Proxy`]) — a [`Directory`] of players and
//!    servers plus a connector actor that performs connection switches in
//!    the background and reports [`ConnectionEvent`]s.
//!
//! # How it fits in the stack
//!
//! ```text
//! Migration core (above)  ← decides who moves where
//!     ↕
//! Proxy runtime (this crate)  ← owns players, servers, connections
//!     ↕
//! Protocol (below)  ← names, notices, identifiers
//! ```

mod connector;
mod directory;
mod error;
mod proxy;
mod runtime;

pub use connector::{
    ConnectFailure, ConnectionEvent, ConnectionRequest,
    ALREADY_CONNECTED_INDICATION,
};
pub use directory::{Directory, PlayerRef, ServerRef};
pub use error::ProxyError;
pub use proxy::{Login, Proxy, ProxyConfig};
pub use runtime::{
    Audience, CommandSource, ConnectedPlayer, Console, KnownServer,
    NoticeReceiver, NoticeSender, ProxyRuntime,
};
