//! Hands a decided migration to the proxy.

use waypoint_proxy::{ConnectedPlayer, KnownServer, ProxyRuntime};

/// Asks `runtime` to move `player` to `target` and returns immediately.
///
/// The proxy reports whether the switch worked on its own channels; nothing
/// comes back here.
pub fn issue_migration<R: ProxyRuntime>(runtime: &R, player: &R::Player, target: &R::Server) {
    tracing::info!(
        player = %player.username(),
        from = ?player.current_server().map(|server| server.as_str()),
        target = %target.name(),
        "issuing migration"
    );
    runtime.connect(player, target);
}
