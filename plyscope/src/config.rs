//! Runtime tunables.
//!
//! Every value has a compile-time default and can be overridden through a
//! dedicated environment variable. Command-line flags take precedence over
//! both; that merge happens in `main`.

use std::path::PathBuf;

/// Default minimum time between two engine restarts (in milliseconds).
pub const DEFAULT_THROTTLE_MS: u64 = 300;

/// Get the engine binary path.
///
/// Priority:
/// 1. `PLYSCOPE_ENGINE_PATH` env variable if set
/// 2. `None`, meaning common install locations are searched
pub fn get_engine_path() -> Option<PathBuf> {
    std::env::var("PLYSCOPE_ENGINE_PATH")
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

/// Get the file that logs are written to.
///
/// Priority:
/// 1. `PLYSCOPE_LOG_PATH` env variable if set
/// 2. `None`, meaning logs go to stderr
pub fn get_log_path() -> Option<PathBuf> {
    std::env::var("PLYSCOPE_LOG_PATH")
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

/// Get the minimum restart interval in milliseconds.
///
/// Priority:
/// 1. `PLYSCOPE_THROTTLE_MS` env variable if set (falls back to default
///    if the value cannot be parsed as a `u64`)
/// 2. `300` ms as fallback
pub fn get_throttle_ms() -> u64 {
    if let Ok(ms) = std::env::var("PLYSCOPE_THROTTLE_MS") {
        return ms.parse().unwrap_or(DEFAULT_THROTTLE_MS);
    }

    DEFAULT_THROTTLE_MS
}
