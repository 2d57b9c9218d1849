//! Unified error type for Waypoint.

use waypoint_migration::CommandError;
use waypoint_protocol::ProtocolError;
use waypoint_proxy::ProxyError;

use crate::config::ConfigError;
use crate::logging::LoggingError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WaypointError {
    /// A backend message or channel identifier was malformed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The proxy runtime refused an operation.
    #[error(transparent)]
    Proxy(#[from] ProxyError),

    /// A command line didn't name a valid command.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The configuration couldn't be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging couldn't be set up.
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_protocol::ServerName;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::NotANumber("abc".into());
        let waypoint_err: WaypointError = err.into();
        assert!(matches!(waypoint_err, WaypointError::Protocol(_)));
        assert!(waypoint_err.to_string().contains("abc"));
    }

    #[test]
    fn test_from_proxy_error() {
        let err = ProxyError::ServerNotFound(ServerName::from("atlantis"));
        let waypoint_err: WaypointError = err.into();
        assert!(matches!(waypoint_err, WaypointError::Proxy(_)));
        assert!(waypoint_err.to_string().contains("atlantis"));
    }

    #[test]
    fn test_from_command_error() {
        let err = CommandError::UnknownCommand("hub".into());
        let waypoint_err: WaypointError = err.into();
        assert!(matches!(waypoint_err, WaypointError::Command(_)));
    }

    #[test]
    fn test_from_config_error() {
        let waypoint_err: WaypointError = ConfigError::EmptyLobby.into();
        assert!(matches!(waypoint_err, WaypointError::Config(_)));
    }
}
