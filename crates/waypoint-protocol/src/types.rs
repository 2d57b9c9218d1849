//! Core protocol types shared by every Waypoint crate.
//!
//! These are the names and envelopes that cross the boundary between the
//! proxy runtime and the migration core: who a player is, what a server is
//! called, which plugin channel a message travelled on, and what a chat
//! notice looks like.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Numeric identity assigned to a player by the proxy at login.
///
/// Usernames can be reused after a player leaves; a `PlayerId` cannot. The
/// connector uses it to tell "the alice who asked to move" apart from "a new
/// alice who logged in afterwards".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A player's username.
///
/// Comparison is exact and case-sensitive. No normalization happens
/// anywhere in Waypoint: `Alice` and `alice` are different players.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(String);

/// The registered name of a backend server, e.g. `lobby` or `survival`.
///
/// Same rules as [`PlayerName`]: exact, case-sensitive equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerName(String);

// Both name types share the same small API, so generate it once.
macro_rules! name_type {
    ($ty:ident) => {
        impl $ty {
            /// Wraps a string as a name.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Returns the name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Unwraps the name back into a `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(name: &str) -> Self {
                Self(name.to_owned())
            }
        }

        impl From<String> for $ty {
            fn from(name: String) -> Self {
                Self(name)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $ty {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $ty {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

name_type!(PlayerName);
name_type!(ServerName);

// ---------------------------------------------------------------------------
// ChannelId
// ---------------------------------------------------------------------------

/// Identifier of a plugin messaging channel, written `namespace:value`.
///
/// Backend servers tag every plugin message with a channel. The proxy only
/// feeds messages on its registered channel (by default
/// [`ChannelId::DEFAULT`], `minibit:main`) into the migration core.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId {
    namespace: String,
    value: String,
}

impl ChannelId {
    /// The channel backend servers use unless configured otherwise.
    pub const DEFAULT: &'static str = "minibit:main";

    /// Builds a channel identifier from its two halves, validating both.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidChannel`] if either half is empty or
    /// contains characters outside the allowed set.
    pub fn new(namespace: &str, value: &str) -> Result<Self, ProtocolError> {
        let valid_namespace = !namespace.is_empty()
            && namespace.chars().all(|c| is_channel_char(c, false));
        let valid_value = !value.is_empty()
            && value.chars().all(|c| is_channel_char(c, true));

        if !valid_namespace || !valid_value {
            return Err(ProtocolError::InvalidChannel(format!(
                "{namespace}:{value}"
            )));
        }

        Ok(Self {
            namespace: namespace.to_owned(),
            value: value.to_owned(),
        })
    }

    /// The part before the colon.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The part after the colon.
    pub fn value(&self) -> &str {
        &self.value
    }
}

fn is_channel_char(c: char, allow_slash: bool) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '.' | '_' | '-')
        || (allow_slash && c == '/')
}

impl Default for ChannelId {
    fn default() -> Self {
        Self {
            namespace: "minibit".to_owned(),
            value: "main".to_owned(),
        }
    }
}

impl FromStr for ChannelId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, value) = s
            .split_once(':')
            .ok_or_else(|| ProtocolError::InvalidChannel(s.to_owned()))?;
        Self::new(namespace, value)
            .map_err(|_| ProtocolError::InvalidChannel(s.to_owned()))
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.value)
    }
}

// ---------------------------------------------------------------------------
// Notice — outbound chat text
// ---------------------------------------------------------------------------

/// Colours a [`Notice`] can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextColor {
    Red,
    Yellow,
    Green,
    Gray,
}

/// A plain chat message sent to a player (or the console).
///
/// This is the only thing the migration core ever says to anyone. It is
/// deliberately tiny: a body and an optional colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TextColor>,
}

impl Notice {
    /// An uncoloured notice.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    /// A notice rendered in the given colour.
    pub fn colored(text: impl Into<String>, color: TextColor) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ---------------------------------------------------------------------------
// MigrationRequest
// ---------------------------------------------------------------------------

/// "Move this player to that server."
///
/// Built from a decoded backend message or from a command invocation, used
/// once, then dropped. It has no identity beyond that single evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRequest {
    pub username: PlayerName,
    pub target: ServerName,
}

// ---------------------------------------------------------------------------
// PluginMessage — the inbound envelope
// ---------------------------------------------------------------------------

/// Who sent a plugin message.
///
/// Plugin messages can arrive from either side of the proxy. Only messages
/// sent by a backend server are trusted as migration requests; a player's
/// client can put anything it likes on any channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    /// A backend server connection.
    Backend(ServerName),
    /// A player's client connection.
    Player(PlayerName),
}

/// A plugin message as delivered by the proxy runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMessage {
    pub source: MessageSource,
    pub channel: ChannelId,
    pub data: Vec<u8>,
}

impl PluginMessage {
    /// A message sent by the named backend server on `channel`.
    pub fn from_backend(
        server: impl Into<ServerName>,
        channel: ChannelId,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            source: MessageSource::Backend(server.into()),
            channel,
            data: data.into(),
        }
    }

    /// A message sent by a player's client on `channel`.
    pub fn from_player(
        player: impl Into<PlayerName>,
        channel: ChannelId,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            source: MessageSource::Player(player.into()),
            channel,
            data: data.into(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
