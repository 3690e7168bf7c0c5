//! Structured logging setup.
//!
//! Library code only emits `tracing` events; binaries, demos and tests call
//! [`init_logging`] once to install a subscriber. `RUST_LOG` takes precedence
//! over the configured level when set.

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{Result, WireError};

/// Install a global fmt subscriber built from `config`
///
/// # Errors
/// Returns `WireError::ConfigError` if a global subscriber is already set
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_ascii_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| WireError::ConfigError(format!("Failed to install subscriber: {e}")))?;

    info!(app = %config.app_name, level = %config.log_level, "logging initialized");
    Ok(())
}

/// Test-friendly variant: writes through the test harness and ignores repeat calls
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails_cleanly() {
        init_test_logging();
        init_test_logging();
        assert!(matches!(
            init_logging(&LoggingConfig::default()),
            Err(WireError::ConfigError(_))
        ));
    }
}
