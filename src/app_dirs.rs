//! Resolve the cache directory for `sniff`.
//!
//! Respects an environment override while falling back to the
//! platform-appropriate location provided by the `dirs` crate.

use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};

const APPLICATION: &str = "sniff";

const CACHE_DIR_ENV: &str = "SNIFF_CACHE_DIR";

/// Resolve an override directory from an environment variable.
///
/// An empty string is treated the same as an unset value so that callers can
/// use shell defaults without worrying about trailing whitespace.
fn dir_from_env(name: &str) -> Option<PathBuf> {
    let value = env::var_os(name)?;
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

/// Return the cache directory that stores serialized index snapshots.
pub fn cache_dir() -> Result<PathBuf> {
    if let Some(dir) = dir_from_env(CACHE_DIR_ENV) {
        return Ok(dir);
    }

    let base = dirs::cache_dir().ok_or_else(|| anyhow!("unable to determine cache directory"))?;
    Ok(base.join(APPLICATION))
}
