//! Error types for the command surface.

/// Errors from parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// No registered command has this name.
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    /// The command takes no arguments but some were given.
    #[error("/{command} takes no arguments (got {args:?})")]
    UnexpectedArguments { command: String, args: String },
}
