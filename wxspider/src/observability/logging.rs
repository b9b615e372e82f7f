//! `tracing-subscriber` setup for hosts embedding the engine.

use tracing_subscriber::EnvFilter;

/// Error returned when a global subscriber is already installed.
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Filter directive used when `RUST_LOG` is not set.
#[must_use]
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "info,wxspider=debug"
    } else {
        "warn"
    }
}

/// Builds the filter: `RUST_LOG` wins, otherwise [`default_directive`].
#[must_use]
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Installs a human-readable fmt subscriber.
pub fn init_logging(verbose: bool) -> Result<(), InitError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(true)
        .try_init()
}

/// Installs a JSON fmt subscriber.
pub fn init_json_logging(verbose: bool) -> Result<(), InitError> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(verbose))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(true), "info,wxspider=debug");
        assert_eq!(default_directive(false), "warn");
    }

    #[test]
    fn test_second_init_fails() {
        // Whichever call wins, a second global install must be rejected.
        let _ = init_logging(false);
        assert!(init_logging(true).is_err());
    }

    #[test]
    fn test_json_init_rejected_once_installed() {
        let _ = init_json_logging(true);
        assert!(init_json_logging(false).is_err());
        assert!(init_logging(false).is_err());
    }
}
