//! `Waypoint`: the plugin facade a proxy integration talks to.
//!
//! It owns the registered plugin channel, the backend message handler and
//! the command dispatcher, and routes proxy events to them:
//!
//! ```text
//! ProxyEvent::PluginMessage ─► source/channel filter ─► BackendMessageHandler
//! ProxyEvent::Command       ─► CommandDispatcher ─► LobbyCommand
//! ```
//!
//! Nothing here is fatal. Dropped and rejected inputs are logged and the
//! next event is handled as usual.

use std::sync::Arc;

use tokio::sync::mpsc;
use waypoint_migration::{
    BackendMessageHandler, BackendReport, CommandDispatcher, CommandOutcome, LobbyCommand,
    Migrator,
};
use waypoint_protocol::{ChannelId, MessageSource, PluginMessage, ServerName};
use waypoint_proxy::{CommandSource, ProxyRuntime};

use crate::config::WaypointConfig;
use crate::WaypointError;

/// An event the proxy hands to the plugin.
#[derive(Debug, Clone)]
pub enum ProxyEvent<P> {
    /// A plugin message arrived on some channel.
    PluginMessage(PluginMessage),

    /// Someone typed a command line.
    Command {
        source: CommandSource<P>,
        input: String,
    },
}

/// Why a plugin message never reached the backend handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// It came from a player's client, not a backend server.
    NotFromBackend,
    /// It was sent on a channel other than the registered one.
    OtherChannel,
}

/// What happened to one plugin message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginMessageResult<S> {
    Ignored(IgnoreReason),
    Handled(BackendReport<S>),
}

/// The Waypoint plugin.
pub struct Waypoint<R: ProxyRuntime> {
    runtime: Arc<R>,
    channel: ChannelId,
    backend: BackendMessageHandler<R>,
    commands: CommandDispatcher<R>,
}

impl<R: ProxyRuntime> Waypoint<R> {
    /// Starts building a plugin bound to `runtime`.
    pub fn builder(runtime: Arc<R>) -> WaypointBuilder<R> {
        WaypointBuilder::new(runtime)
    }

    /// The runtime this plugin acts on.
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// The plugin channel backend messages are accepted on.
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// The server the lobby command sends players to.
    pub fn lobby(&self) -> &ServerName {
        self.commands.lobby().lobby()
    }

    /// Every name the lobby command answers to.
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.names()
    }

    /// Handles one plugin message.
    ///
    /// Only messages sent by a backend server on the registered channel
    /// are decoded; everything else is ignored untouched.
    pub fn on_plugin_message(&self, message: &PluginMessage) -> PluginMessageResult<R::Server> {
        let server = match &message.source {
            MessageSource::Backend(server) => server,
            MessageSource::Player(player) => {
                tracing::debug!(%player, channel = %message.channel, "ignoring plugin message from player");
                return PluginMessageResult::Ignored(IgnoreReason::NotFromBackend);
            }
        };

        if message.channel != self.channel {
            tracing::debug!(%server, channel = %message.channel, "ignoring plugin message on other channel");
            return PluginMessageResult::Ignored(IgnoreReason::OtherChannel);
        }

        tracing::debug!(%server, len = message.data.len(), "backend message received");
        PluginMessageResult::Handled(self.backend.handle(&message.data))
    }

    /// Parses and runs a command line for `source`.
    ///
    /// # Errors
    /// [`WaypointError::Command`] if the line doesn't name a command this
    /// plugin owns, or passes it arguments.
    pub fn execute_command(
        &self,
        source: &CommandSource<R::Player>,
        input: &str,
    ) -> Result<CommandOutcome<R::Server>, WaypointError> {
        Ok(self.commands.dispatch(source, input)?)
    }

    /// Handles events until the sender side is dropped.
    pub async fn run(&self, mut events: mpsc::Receiver<ProxyEvent<R::Player>>) {
        tracing::info!(channel = %self.channel, "waypoint event loop started");

        while let Some(event) = events.recv().await {
            match event {
                ProxyEvent::PluginMessage(message) => {
                    self.on_plugin_message(&message);
                }
                ProxyEvent::Command { source, input } => {
                    if let Err(e) = self.execute_command(&source, &input) {
                        tracing::debug!(source = %source.label(), error = %e, "command rejected");
                    }
                }
            }
        }

        tracing::info!("waypoint event loop stopped");
    }
}

/// Builder for [`Waypoint`].
///
/// Starts from [`WaypointConfig::default`]; individual settings can be
/// overridden after [`config`](Self::config).
pub struct WaypointBuilder<R> {
    runtime: Arc<R>,
    config: WaypointConfig,
}

impl<R: ProxyRuntime> WaypointBuilder<R> {
    pub fn new(runtime: Arc<R>) -> Self {
        Self {
            runtime,
            config: WaypointConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: WaypointConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the lobby server name.
    pub fn lobby(mut self, server: impl Into<String>) -> Self {
        self.config.lobby.server = server.into();
        self
    }

    /// Sets the lobby command aliases.
    pub fn aliases<I, A>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.config.lobby.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the plugin channel.
    pub fn channel(mut self, channel: &ChannelId) -> Self {
        self.config.channel = channel.to_string();
        self
    }

    /// Validates the configuration and builds the plugin.
    ///
    /// # Errors
    /// [`WaypointError::Config`] if the configuration is invalid.
    pub fn build(self) -> Result<Waypoint<R>, WaypointError> {
        self.config.validate()?;
        let channel = self.config.channel_id()?;

        let migrator = Migrator::new(Arc::clone(&self.runtime));
        let lobby = LobbyCommand::new(migrator.clone(), self.config.lobby.server.as_str());
        let commands = CommandDispatcher::new(lobby, self.config.lobby.aliases);
        let backend = BackendMessageHandler::new(migrator);

        let names: Vec<&str> = commands.names().collect();
        tracing::info!(%channel, "registered plugin channel");
        tracing::info!(lobby = %self.config.lobby.server, commands = ?names, "registered lobby command");

        Ok(Waypoint {
            runtime: self.runtime,
            channel,
            backend,
            commands,
        })
    }
}
