//! The migration decision: stay, complain, or move.
//!
//! Both entry points (backend messages and the lobby command) end up here
//! with the same three inputs: where the player is now, where they want to
//! go, and whether that destination exists. The answer is one of three
//! [`MigrationOutcome`]s, chosen in a fixed order:
//!
//! 1. `current == target` → [`AlreadyAtTarget`](MigrationOutcome::AlreadyAtTarget),
//!    even if the target is registered.
//! 2. target not registered → [`TargetUnknown`](MigrationOutcome::TargetUnknown).
//! 3. otherwise → [`MigrationIssued`](MigrationOutcome::MigrationIssued),
//!    carrying the resolved server handle.
//!
//! Name comparison is exact and case-sensitive. Nothing in this module
//! sends notices or starts connections.

use waypoint_protocol::ServerName;
use waypoint_proxy::KnownServer;

/// What should happen to a migration request.
///
/// `S` is the runtime's server handle type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome<S> {
    /// The player is already on the requested server.
    AlreadyAtTarget { target: ServerName },

    /// No server is registered under the requested name.
    TargetUnknown { target: ServerName },

    /// The player should be moved to `target`.
    MigrationIssued { target: S },
}

impl<S: KnownServer> MigrationOutcome<S> {
    /// The name of the server the request was about.
    pub fn target_name(&self) -> &ServerName {
        match self {
            Self::AlreadyAtTarget { target } | Self::TargetUnknown { target } => target,
            Self::MigrationIssued { target } => target.name(),
        }
    }

    /// Returns `true` if a connection switch was (or will be) requested.
    pub fn is_issued(&self) -> bool {
        matches!(self, Self::MigrationIssued { .. })
    }
}

/// Decides a migration given an already-resolved target.
pub fn decide<S>(current: &str, target_name: &str, target: Option<S>) -> MigrationOutcome<S> {
    decide_with(current, target_name, move |_| target)
}

/// Decides a migration, resolving the target only when needed.
///
/// `resolve` is called at most once, and never when `current` equals
/// `target_name`.
pub fn decide_with<S, F>(current: &str, target_name: &str, resolve: F) -> MigrationOutcome<S>
where
    F: FnOnce(&str) -> Option<S>,
{
    if current == target_name {
        return MigrationOutcome::AlreadyAtTarget {
            target: ServerName::from(target_name),
        };
    }

    match resolve(target_name) {
        Some(target) => MigrationOutcome::MigrationIssued { target },
        None => MigrationOutcome::TargetUnknown {
            target: ServerName::from(target_name),
        },
    }
}
