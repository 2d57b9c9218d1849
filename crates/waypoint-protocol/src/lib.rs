//! Wire-level types for Waypoint.
//!
//! This crate defines what travels between backend servers, the proxy, and
//! players:
//!
//! - **Types** ([`PlayerName`], [`ServerName`], [`ChannelId`], [`Notice`],
//!   [`PluginMessage`], ...) — identities and envelopes.
//! - **Codec** ([`decode`], [`BackendMessage`]) — the NUL-delimited
//!   backend-to-proxy message format.
//! - **Errors** ([`ProtocolError`]) — what makes a message malformed.
//!
//! # Architecture
//!
//! ```text
//! Backend server (bytes) → Protocol (BackendMessage) → Migration core
//! ```
//!
//! Nothing here touches the network or the proxy's state. Every function
//! is pure.

mod codec;
mod error;
mod types;

pub use codec::{
    decode, encode_fields, BackendMessage, RawMessage, FIELD_DELIMITER,
    SWITCH_SERVER,
};
pub use error::ProtocolError;
pub use types::{
    ChannelId, MessageSource, MigrationRequest, Notice, PlayerId, PlayerName,
    PluginMessage, ServerName, TextColor,
};
