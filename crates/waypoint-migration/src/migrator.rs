//! `Migrator`: the outcome handling shared by both entry points.
//!
//! Given a resolved player and a target name, the migrator reads the
//! player's current server, runs the decision, and acts on it:
//!
//! | outcome            | action                                 |
//! |--------------------|----------------------------------------|
//! | `AlreadyAtTarget`  | notice "You're already in that server!" |
//! | `TargetUnknown`    | notice "That server was not found!"     |
//! | `MigrationIssued`  | [`issue_migration`], no notice          |
//!
//! Notices are best effort. If the player can't be reached the failure is
//! swallowed and the outcome is still reported to the caller.

use std::sync::Arc;

use waypoint_protocol::{Notice, PlayerName, ProtocolError, ServerName, TextColor};
use waypoint_proxy::{ConnectedPlayer, ProxyRuntime};

use crate::decision::{decide_with, MigrationOutcome};
use crate::invoker::issue_migration;
use crate::notices::{ALREADY_IN_SERVER, SERVER_NOT_FOUND};

/// Why a request was dropped without any visible effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropReason {
    /// The payload couldn't be decoded.
    #[error("malformed message: {0}")]
    Malformed(#[from] ProtocolError),

    /// No connected player has this username.
    #[error("player {0} is not connected")]
    PlayerOffline(PlayerName),

    /// The player is connected but not attached to a backend server.
    #[error("player {0} is not on a server")]
    NotOnServer(PlayerName),
}

/// Runs decisions against a proxy runtime and carries out the result.
pub struct Migrator<R> {
    runtime: Arc<R>,
}

impl<R> Clone for Migrator<R> {
    fn clone(&self) -> Self {
        Self {
            runtime: Arc::clone(&self.runtime),
        }
    }
}

impl<R: ProxyRuntime> Migrator<R> {
    pub fn new(runtime: Arc<R>) -> Self {
        Self { runtime }
    }

    /// The runtime this migrator acts on.
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Looks up `username`, then migrates them like [`migrate`](Self::migrate).
    ///
    /// # Errors
    /// [`DropReason::PlayerOffline`] if nobody by that name is connected.
    pub fn migrate_by_name(
        &self,
        username: &str,
        target_name: &str,
        color: Option<TextColor>,
    ) -> Result<MigrationOutcome<R::Server>, DropReason> {
        let player = self
            .runtime
            .player_by_name(username)
            .ok_or_else(|| DropReason::PlayerOffline(PlayerName::from(username)))?;

        self.migrate(&player, target_name, color)
    }

    /// Decides and acts on moving `player` to `target_name`.
    ///
    /// Notices are sent in `color` (`None` for plain text).
    ///
    /// # Errors
    /// [`DropReason::NotOnServer`] if the player has no current server; in
    /// that case nothing is sent and nothing is issued.
    pub fn migrate(
        &self,
        player: &R::Player,
        target_name: &str,
        color: Option<TextColor>,
    ) -> Result<MigrationOutcome<R::Server>, DropReason> {
        let current = player
            .current_server()
            .ok_or_else(|| DropReason::NotOnServer(player.username().clone()))?;

        let outcome = decide_with(current.as_str(), target_name, |name| {
            self.runtime.server_by_name(name)
        });

        self.apply(player, &outcome, color);
        Ok(outcome)
    }

    /// Like [`migrate`](Self::migrate), but a player with no current server
    /// counts as being somewhere other than `target_name` and is sent there.
    pub fn send_to(
        &self,
        player: &R::Player,
        target_name: &str,
        color: Option<TextColor>,
    ) -> MigrationOutcome<R::Server> {
        let resolve = |name: &str| self.runtime.server_by_name(name);
        let outcome = match player.current_server() {
            Some(current) => decide_with(current.as_str(), target_name, resolve),
            None => match resolve(target_name) {
                Some(target) => MigrationOutcome::MigrationIssued { target },
                None => MigrationOutcome::TargetUnknown {
                    target: ServerName::from(target_name),
                },
            },
        };

        self.apply(player, &outcome, color);
        outcome
    }

    fn apply(
        &self,
        player: &R::Player,
        outcome: &MigrationOutcome<R::Server>,
        color: Option<TextColor>,
    ) {
        match outcome {
            MigrationOutcome::AlreadyAtTarget { .. } => {
                notify(player, ALREADY_IN_SERVER, color);
            }
            MigrationOutcome::TargetUnknown { .. } => {
                notify(player, SERVER_NOT_FOUND, color);
            }
            MigrationOutcome::MigrationIssued { target } => {
                issue_migration(self.runtime.as_ref(), player, target);
            }
        }
    }
}

/// Sends `text` to `player`, ignoring delivery failures.
fn notify<P: ConnectedPlayer>(player: &P, text: &str, color: Option<TextColor>) {
    let notice = match color {
        Some(color) => Notice::colored(text, color),
        None => Notice::plain(text),
    };

    if let Err(e) = player.send_notice(notice) {
        tracing::debug!(player = %player.username(), error = %e, "notice not delivered");
    }
}
