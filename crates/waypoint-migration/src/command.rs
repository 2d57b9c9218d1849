//! The `lobby` command: a player sends themselves to the lobby server.
//!
//! This is the second entry point into the migration logic. Instead of a
//! backend naming a player and a target, the invoking player is the subject
//! and the target is always the configured lobby. Only players may run it;
//! the console gets a fixed refusal and nothing else happens.

use waypoint_protocol::{Notice, ServerName, TextColor};
use waypoint_proxy::{Audience, CommandSource, ProxyRuntime};

use crate::decision::MigrationOutcome;
use crate::migrator::Migrator;
use crate::notices::PLAYER_ONLY;
use crate::CommandError;

/// Primary name of the lobby command.
pub const LOBBY_COMMAND: &str = "lobby";

/// Colour of every notice the command path sends.
const COMMAND_COLOR: TextColor = TextColor::Red;

/// What happened to one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome<S> {
    /// The source wasn't a player; they got the player-only reply.
    NotAPlayer,

    /// A migration to the lobby was decided (and acted on).
    Migration(MigrationOutcome<S>),
}

/// Sends the invoking player to the lobby.
pub struct LobbyCommand<R> {
    migrator: Migrator<R>,
    lobby: ServerName,
}

impl<R: ProxyRuntime> LobbyCommand<R> {
    pub fn new(migrator: Migrator<R>, lobby: impl Into<ServerName>) -> Self {
        Self {
            migrator,
            lobby: lobby.into(),
        }
    }

    /// The server this command sends players to.
    pub fn lobby(&self) -> &ServerName {
        &self.lobby
    }

    /// Runs the command for `source`.
    pub fn execute(&self, source: &CommandSource<R::Player>) -> CommandOutcome<R::Server> {
        let Some(player) = source.as_player() else {
            tracing::debug!(source = %source.label(), "lobby command refused for non-player");
            if let Err(e) = source.send_notice(Notice::colored(PLAYER_ONLY, COMMAND_COLOR)) {
                tracing::debug!(error = %e, "notice not delivered");
            }
            return CommandOutcome::NotAPlayer;
        };

        // Players between servers are still sent to the lobby.
        let outcome = self
            .migrator
            .send_to(player, self.lobby.as_str(), Some(COMMAND_COLOR));
        CommandOutcome::Migration(outcome)
    }
}

/// Routes command lines to the lobby command.
pub struct CommandDispatcher<R> {
    lobby: LobbyCommand<R>,
    aliases: Vec<String>,
}

impl<R: ProxyRuntime> CommandDispatcher<R> {
    pub fn new<I, A>(lobby: LobbyCommand<R>, aliases: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            lobby,
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }

    /// Every name the lobby command answers to, primary name first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(LOBBY_COMMAND).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn lobby(&self) -> &LobbyCommand<R> {
        &self.lobby
    }

    /// Parses `input` and runs the matching command for `source`.
    ///
    /// Surrounding whitespace and one leading `/` are ignored. Names are
    /// matched exactly.
    ///
    /// # Errors
    /// - [`CommandError::UnknownCommand`] — no command by that name
    /// - [`CommandError::UnexpectedArguments`] — arguments were given
    pub fn dispatch(
        &self,
        source: &CommandSource<R::Player>,
        input: &str,
    ) -> Result<CommandOutcome<R::Server>, CommandError> {
        let line = input.trim();
        let line = line.strip_prefix('/').unwrap_or(line);

        let (name, args) = match line.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (line, ""),
        };

        if !self.names().any(|known| known == name) {
            return Err(CommandError::UnknownCommand(name.to_owned()));
        }

        if !args.is_empty() {
            return Err(CommandError::UnexpectedArguments {
                command: name.to_owned(),
                args: args.to_owned(),
            });
        }

        tracing::debug!(source = %source.label(), command = name, "dispatching command");
        Ok(self.lobby.execute(source))
    }
}
