//! Logging bootstrap built on `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

/// Default filter directives when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVES: &str = "info,tessera_geometry=debug";

/// Install a formatting subscriber for the whole process.
///
/// `RUST_LOG` overrides [`DEFAULT_DIRECTIVES`]. Calling this twice is harmless,
/// the second installation is ignored.
pub fn init() {
    init_with_directives(DEFAULT_DIRECTIVES);
}

/// Install a formatting subscriber using `directives` as the fallback filter.
pub fn init_with_directives(directives: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed, keeping it");
    }
}

/// Install a subscriber writing through the test harness capture.
///
/// Intended for `#[test]` functions that want builder logs on failure.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("trace"))
        .with_test_writer()
        .try_init();
}
