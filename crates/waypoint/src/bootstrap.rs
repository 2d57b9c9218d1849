//! Wiring an in-memory proxy and the plugin together from a config.

use std::sync::Arc;

use waypoint_proxy::Proxy;

use crate::config::WaypointConfig;
use crate::{Waypoint, WaypointError};

/// Starts an in-memory [`Proxy`] with every server from `config`
/// registered.
///
/// Must be called inside a Tokio runtime.
///
/// # Errors
/// [`WaypointError::Config`] if the config is invalid.
pub fn start_proxy(config: &WaypointConfig) -> Result<Proxy, WaypointError> {
    config.validate()?;

    let proxy = Proxy::start();
    for server in &config.servers {
        proxy.register_server(server.name.as_str(), server.address.as_str())?;
        if !server.accepting {
            proxy.set_accepting(&server.name, false)?;
        }
        tracing::info!(
            server = %server.name,
            address = %server.address,
            accepting = server.accepting,
            "registered backend server"
        );
    }

    Ok(proxy)
}

/// Starts an in-memory proxy and a plugin bound to it.
///
/// # Errors
/// As [`start_proxy`] and [`WaypointBuilder::build`](crate::WaypointBuilder::build).
pub fn start(config: WaypointConfig) -> Result<(Arc<Proxy>, Waypoint<Proxy>), WaypointError> {
    let proxy = Arc::new(start_proxy(&config)?);
    let waypoint = Waypoint::builder(Arc::clone(&proxy)).config(config).build()?;
    Ok((proxy, waypoint))
}
