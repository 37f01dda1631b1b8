//! Logging initialization and configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "simple_chat=info";

/// Initialize the logging system.
///
/// Uses the `RUST_LOG` environment variable for filtering. If not set,
/// defaults to `simple_chat=info`.
///
/// # Panics
///
/// Panics if called more than once, or if another tracing subscriber
/// has already been set.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}

/// Initialize the logging system with an explicit filter directive.
///
/// Accepts anything `EnvFilter` understands, from a bare level (`debug`)
/// to a full directive list. Falls back to the default filter when the
/// directive does not parse.
///
/// # Panics
///
/// Panics if a tracing subscriber has already been set.
pub fn init_with_filter(directive: &str) {
    tracing_subscriber::registry()
        .with(filter_for(directive))
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}

fn filter_for(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_init_idempotent() {
        let _ = try_init();
        // Second call errors (already initialized) but must not panic
        let _ = try_init();
    }

    #[test]
    fn test_filter_for_accepts_levels() {
        assert!(filter_for("debug").to_string().contains("debug"));
        assert!(filter_for("simple_chat=trace")
            .to_string()
            .contains("simple_chat=trace"));
    }

    #[test]
    fn test_filter_for_falls_back() {
        assert_eq!(filter_for("simple_chat=notalevel").to_string(), DEFAULT_FILTER);
    }

    #[test]
    fn test_logging_works() {
        let _ = try_init();

        tracing::info!("test info message");
        tracing::debug!("test debug message");
        tracing::warn!("test warn message");
    }
}
