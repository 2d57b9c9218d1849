//! Handling of backend-originated plugin messages.
//!
//! A backend server asks the proxy to move one of its players by sending
//! `1\0<username>\0<target>` on the plugin channel. The handler decodes the
//! payload and passes the request to the [`Migrator`]. Anything it can't act
//! on is dropped quietly: malformed payloads, players who aren't connected,
//! and message types it doesn't know. Drops are logged at debug level and
//! never reach the backend.

use waypoint_protocol::BackendMessage;
use waypoint_proxy::ProxyRuntime;

use crate::decision::MigrationOutcome;
use crate::migrator::{DropReason, Migrator};

/// What happened to one backend message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendReport<S> {
    /// A migration request was decided (and acted on).
    Migration(MigrationOutcome<S>),

    /// The message was dropped with no visible effect.
    Dropped(DropReason),

    /// A well-formed message of a type this handler doesn't act on.
    Ignored { msg_type: i32 },
}

/// Decodes backend messages and runs the migrations they ask for.
pub struct BackendMessageHandler<R> {
    migrator: Migrator<R>,
}

impl<R: ProxyRuntime> BackendMessageHandler<R> {
    pub fn new(migrator: Migrator<R>) -> Self {
        Self { migrator }
    }

    /// Handles one raw payload received from a backend server.
    ///
    /// Notices sent from here are plain text.
    pub fn handle(&self, raw: &[u8]) -> BackendReport<R::Server> {
        let message = match BackendMessage::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, len = raw.len(), "dropping malformed backend message");
                return BackendReport::Dropped(DropReason::Malformed(e));
            }
        };

        match message {
            BackendMessage::SwitchServer(request) => {
                let result = self.migrator.migrate_by_name(
                    request.username.as_str(),
                    request.target.as_str(),
                    None,
                );

                match result {
                    Ok(outcome) => {
                        tracing::debug!(
                            player = %request.username,
                            target = %request.target,
                            issued = outcome.is_issued(),
                            "backend switch request handled"
                        );
                        BackendReport::Migration(outcome)
                    }
                    Err(reason) => {
                        tracing::debug!(
                            player = %request.username,
                            target = %request.target,
                            %reason,
                            "dropping backend switch request"
                        );
                        BackendReport::Dropped(reason)
                    }
                }
            }
            BackendMessage::Unknown { msg_type, .. } => {
                tracing::debug!(msg_type, "ignoring backend message of unknown type");
                BackendReport::Ignored { msg_type }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use waypoint_protocol::{Notice, ProtocolError};

    use super::*;
    use crate::notices::{ALREADY_IN_SERVER, SERVER_NOT_FOUND};
    use crate::testing::{MockRuntime, MockServer};

    fn handler(runtime: &Arc<MockRuntime>) -> BackendMessageHandler<MockRuntime> {
        BackendMessageHandler::new(Migrator::new(Arc::clone(runtime)))
    }

    #[test]
    fn test_handle_switch_request_issues_migration() {
        let runtime = Arc::new(MockRuntime::new(&["lobby", "survival"]));
        runtime.add_player("alice", Some("lobby"));

        let report = handler(&runtime).handle(b"1\0alice\0survival");

        assert_eq!(
            report,
            BackendReport::Migration(MigrationOutcome::MigrationIssued {
                target: MockServer::named("survival"),
            })
        );
        assert_eq!(runtime.connects().len(), 1);
        assert!(runtime.notices("alice").is_empty());
    }

    #[test]
    fn test_handle_same_server_sends_plain_notice() {
        let runtime = Arc::new(MockRuntime::new(&["lobby", "survival"]));
        runtime.add_player("alice", Some("lobby"));

        handler(&runtime).handle(b"1\0alice\0lobby");

        assert_eq!(runtime.notices("alice"), vec![Notice::plain(ALREADY_IN_SERVER)]);
        assert!(runtime.connects().is_empty());
    }

    #[test]
    fn test_handle_unknown_target_sends_plain_notice() {
        let runtime = Arc::new(MockRuntime::new(&["lobby"]));
        runtime.add_player("alice", Some("lobby"));

        handler(&runtime).handle(b"1\0alice\0atlantis");

        assert_eq!(runtime.notices("alice"), vec![Notice::plain(SERVER_NOT_FOUND)]);
    }

    #[test]
    fn test_handle_non_numeric_type_is_dropped() {
        let runtime = Arc::new(MockRuntime::new(&["lobby"]));
        runtime.add_player("alice", Some("lobby"));

        let report = handler(&runtime).handle(b"abc\0alice\0lobby");

        assert_eq!(
            report,
            BackendReport::Dropped(DropReason::Malformed(ProtocolError::NotANumber(
                "abc".into()
            )))
        );
        assert!(runtime.notices("alice").is_empty());
        assert!(runtime.server_lookups().is_empty());
    }

    #[test]
    fn test_handle_missing_fields_is_dropped() {
        let runtime = Arc::new(MockRuntime::new(&["lobby"]));
        runtime.add_player("alice", Some("lobby"));

        let report = handler(&runtime).handle(b"1\0alice");

        assert!(matches!(
            report,
            BackendReport::Dropped(DropReason::Malformed(ProtocolError::MissingFields { .. }))
        ));
        assert!(runtime.connects().is_empty());
    }

    #[test]
    fn test_handle_offline_player_is_dropped_without_lookup() {
        let runtime = Arc::new(MockRuntime::new(&["survival"]));

        let report = handler(&runtime).handle(b"1\0ghost\0survival");

        assert_eq!(
            report,
            BackendReport::Dropped(DropReason::PlayerOffline("ghost".into()))
        );
        assert!(runtime.server_lookups().is_empty());
        assert!(runtime.connects().is_empty());
    }

    #[test]
    fn test_handle_unknown_type_is_ignored() {
        let runtime = Arc::new(MockRuntime::new(&["lobby"]));
        runtime.add_player("alice", Some("lobby"));

        let report = handler(&runtime).handle(b"7\0alice\0lobby");

        assert_eq!(report, BackendReport::Ignored { msg_type: 7 });
        assert!(runtime.notices("alice").is_empty());
    }

    #[test]
    fn test_handle_extra_fields_are_ignored() {
        let runtime = Arc::new(MockRuntime::new(&["lobby", "survival"]));
        runtime.add_player("alice", Some("lobby"));

        let report = handler(&runtime).handle(b"1\0alice\0survival\0extra");

        assert!(matches!(report, BackendReport::Migration(ref o) if o.is_issued()));
    }
}
