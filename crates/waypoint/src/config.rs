//! Configuration for the Waypoint plugin.
//!
//! Loaded from a JSON file. Every field has a default, so an empty object
//! (`{}`) is a valid configuration:
//!
//! ```json
//! {
//!   "channel": "minibit:main",
//!   "lobby": { "server": "lobby", "aliases": ["l"] },
//!   "servers": [
//!     { "name": "lobby", "address": "10.0.0.1:25565" },
//!     { "name": "survival", "address": "10.0.0.2:25565", "accepting": false }
//!   ],
//!   "log": { "filter": "info" }
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use waypoint_protocol::{ChannelId, ProtocolError};

/// Errors from loading or validating a [`WaypointConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file couldn't be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file isn't valid JSON or doesn't match the schema.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The plugin channel isn't a valid `namespace:value` identifier.
    #[error("invalid plugin channel: {0}")]
    Channel(#[from] ProtocolError),

    /// The lobby server name is empty.
    #[error("lobby server name must not be empty")]
    EmptyLobby,

    /// A command alias is empty or contains whitespace.
    #[error("invalid command alias {0:?}")]
    InvalidAlias(String),

    /// A server entry has an empty name.
    #[error("server names must not be empty")]
    EmptyServerName,

    /// Two server entries share a name.
    #[error("server {0} is listed twice")]
    DuplicateServer(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypointConfig {
    /// Plugin messaging channel backend servers send requests on.
    pub channel: String,
    /// The lobby command.
    pub lobby: LobbyConfig,
    /// Backend servers to register with the in-memory proxy.
    pub servers: Vec<ServerConfig>,
    /// Logging.
    pub log: LogConfig,
}

impl Default for WaypointConfig {
    fn default() -> Self {
        Self {
            channel: ChannelId::DEFAULT.to_owned(),
            lobby: LobbyConfig::default(),
            servers: Vec::new(),
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    /// Server the lobby command sends players to.
    pub server: String,
    /// Extra names the lobby command answers to.
    pub aliases: Vec<String>,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            server: "lobby".to_owned(),
            aliases: vec!["l".to_owned()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub address: String,
    #[serde(default = "default_accepting")]
    pub accepting: bool,
}

fn default_accepting() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` isn't set.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}

impl WaypointConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    /// [`ConfigError::Json`] for bad JSON, or any validation error.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file can't be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), servers = config.servers.len(), "loaded config");
        Ok(config)
    }

    /// Checks the config for values that can't work.
    ///
    /// # Errors
    /// The first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.channel_id()?;

        if self.lobby.server.trim().is_empty() {
            return Err(ConfigError::EmptyLobby);
        }

        if let Some(alias) = self
            .lobby
            .aliases
            .iter()
            .find(|alias| alias.is_empty() || alias.contains(char::is_whitespace))
        {
            return Err(ConfigError::InvalidAlias(alias.clone()));
        }

        let mut seen = HashSet::new();
        for server in &self.servers {
            if server.name.is_empty() {
                return Err(ConfigError::EmptyServerName);
            }
            if !seen.insert(server.name.as_str()) {
                return Err(ConfigError::DuplicateServer(server.name.clone()));
            }
        }

        Ok(())
    }

    /// The parsed plugin channel.
    ///
    /// # Errors
    /// [`ConfigError::Channel`] if `channel` isn't a valid identifier.
    pub fn channel_id(&self) -> Result<ChannelId, ConfigError> {
        Ok(self.channel.parse()?)
    }
}
