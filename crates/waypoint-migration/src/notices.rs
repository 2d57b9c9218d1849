//! Fixed reply texts.

/// Sent when the player asks for the server they're already on.
pub const ALREADY_IN_SERVER: &str = "You're already in that server!";

/// Sent when the requested server isn't registered with the proxy.
pub const SERVER_NOT_FOUND: &str = "That server was not found!";

/// Sent when a non-player runs a player-only command.
pub const PLAYER_ONLY: &str = "This is a player only command!";
