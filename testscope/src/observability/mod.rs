//! Tracing subscriber installation.

use crate::config::LoggingConfig;
use crate::errors::TestscopeError;
use tracing_subscriber::EnvFilter;

/// Builds the filter: `RUST_LOG` when set, otherwise the configured directives.
///
/// # Errors
///
/// Returns `TestscopeError::Config` if the configured directives do not parse.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, TestscopeError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|err| TestscopeError::Config(format!("invalid log filter {:?}: {err}", config.filter))),
    }
}

/// Installs a global `fmt` subscriber.
///
/// Returns `Ok(false)` if another subscriber was already installed; the
/// existing one is kept.
///
/// # Errors
///
/// Returns `TestscopeError::Config` if the filter directives do not parse.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, TestscopeError> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!(filter = %config.filter, json = config.json, "Tracing initialized");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        let config = LoggingConfig::default().with_filter("testscope=debug");

        let _ = init_tracing(&config).unwrap();
        assert!(!init_tracing(&config).unwrap());
    }

    #[test]
    fn test_invalid_filter() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig::default().with_filter("testscope=notalevel");
        let err = init_tracing(&config).unwrap_err();

        assert!(matches!(err, TestscopeError::Config(_)));
    }
}
