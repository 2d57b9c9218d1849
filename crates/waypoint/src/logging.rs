//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when it is set; otherwise the filter from [`LogConfig`]
//! is used. Initialisation goes through `try_init`, so calling [`init`] a
//! second time returns an error instead of panicking.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogConfig;

/// Errors from installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The configured filter directive doesn't parse.
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// A global subscriber is already installed.
    #[error("logging already initialised: {0}")]
    AlreadyInitialised(#[from] tracing_subscriber::util::TryInitError),
}

/// Builds the filter: `RUST_LOG` if set, else `config.filter`.
///
/// # Errors
/// [`LoggingError::Filter`] if `config.filter` is not a valid directive.
pub fn filter(config: &LogConfig) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.filter)?),
    }
}

/// Installs the global tracing subscriber.
///
/// # Errors
/// See [`LoggingError`].
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(filter(config)?)
        .with(fmt::layer().with_target(false))
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_accepts_directive() {
        let config = LogConfig {
            filter: "waypoint=debug,info".to_owned(),
        };
        assert!(filter(&config).is_ok());
    }

    #[test]
    fn test_init_twice_returns_error() {
        let config = LogConfig::default();
        let _ = init(&config);
        assert!(matches!(
            init(&config),
            Err(LoggingError::AlreadyInitialised(_))
        ));
    }
}
