//! Logging setup for hosts that embed the bridge.
//!
//! The bridge only emits `tracing` events. Hosts that already run a
//! subscriber need nothing from here; others can call [`init`] once at
//! startup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Initialize tracing with the default filter.
pub fn init() -> bool {
    init_with_filter(DEFAULT_FILTER)
}

/// Initialize tracing with a custom default filter.
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `false` if a
/// global subscriber was already installed; repeated calls are harmless.
pub fn init_with_filter(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        init_with_filter("debug");
        assert!(!init());
    }
}
