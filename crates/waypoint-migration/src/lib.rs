//! Connection migration for Waypoint.
//!
//! Moves players between backend servers, on request of a backend server
//! or of the player.
//!
//! # Key types
//!
//! - [`decide`] / [`MigrationOutcome`] — the pure decision
//! - [`issue_migration`] — hands a decided migration to the proxy
//! - [`Migrator`] — decision plus notices plus invocation
//! - [`BackendMessageHandler`] — entry point for backend plugin messages
//! - [`LobbyCommand`] / [`CommandDispatcher`] — entry point for players

mod backend;
mod command;
mod decision;
mod error;
mod invoker;
mod migrator;
pub mod notices;

#[cfg(test)]
mod testing;

pub use backend::{BackendMessageHandler, BackendReport};
pub use command::{CommandDispatcher, CommandOutcome, LobbyCommand, LOBBY_COMMAND};
pub use decision::{decide, decide_with, MigrationOutcome};
pub use error::CommandError;
pub use invoker::issue_migration;
pub use migrator::{DropReason, Migrator};
