//! Tessera Core
//!
//! Shared plumbing for the Tessera geometry crates: logging bootstrap,
//! profiling scopes and the hash collections used by the builders.

pub mod alloc;
pub mod logging;
pub mod profiling;
