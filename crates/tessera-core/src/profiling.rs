//! Profiling utilities based on the `puffin` crate.
//!
//! With the `profiling` feature disabled the scope macros expand to nothing,
//! so geometry builders can be instrumented unconditionally.

#[cfg(feature = "profiling")]
use std::sync::OnceLock;

#[cfg(feature = "profiling")]
pub use puffin::{GlobalProfiler, profile_function, profile_scope};

#[cfg(not(feature = "profiling"))]
pub use crate::{profile_function, profile_scope};

/// No-op stand-in for `puffin::profile_function!`.
#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_function {
    ($($arg:tt)*) => {};
}

/// No-op stand-in for `puffin::profile_scope!`.
#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_scope {
    ($($arg:tt)*) => {};
}

/// Profiling backend options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingBackend {
    /// Send profiling data to puffin_viewer via HTTP.
    PuffinHttp,
}

/// Address the puffin HTTP server listens on by default.
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:8585";

#[cfg(feature = "profiling")]
static PROFILING_SERVER: OnceLock<puffin_http::Server> = OnceLock::new();

/// Start profiling on [`DEFAULT_ADDRESS`].
///
/// # Example
/// ```no_run
/// use tessera_core::profiling::{init_profiling, ProfilingBackend};
///
/// init_profiling(ProfilingBackend::PuffinHttp);
/// ```
pub fn init_profiling(backend: ProfilingBackend) {
    init_profiling_at(backend, DEFAULT_ADDRESS);
}

/// Start profiling with the server bound to `address`.
///
/// Only the first successful call keeps a server alive; later servers are
/// dropped immediately.
#[cfg(feature = "profiling")]
pub fn init_profiling_at(backend: ProfilingBackend, address: &str) {
    match backend {
        ProfilingBackend::PuffinHttp => {
            puffin::set_scopes_on(true);

            match puffin_http::Server::new(address) {
                Ok(server) => {
                    tracing::info!("Puffin profiler server started on http://{}", address);
                    let _ = PROFILING_SERVER.set(server);
                }
                Err(e) => {
                    tracing::error!("Failed to start puffin server on {}: {}", address, e);
                }
            }
        }
    }
}

/// Without the `profiling` feature there is nothing to start.
#[cfg(not(feature = "profiling"))]
pub fn init_profiling_at(backend: ProfilingBackend, address: &str) {
    tracing::debug!(
        "Profiling feature disabled, ignoring {:?} on {}",
        backend,
        address
    );
}

/// True if puffin scopes are currently recorded.
pub fn is_enabled() -> bool {
    #[cfg(feature = "profiling")]
    {
        puffin::are_scopes_on()
    }
    #[cfg(not(feature = "profiling"))]
    {
        false
    }
}

/// Mark a frame boundary so scopes from consecutive payload builds are
/// grouped separately in the viewer.
#[inline]
pub fn new_frame() {
    #[cfg(feature = "profiling")]
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_off_until_initialized() {
        assert!(!is_enabled());
        new_frame();
    }
}
