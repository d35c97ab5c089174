pub mod user;

use std::path::PathBuf;

use crate::error::{Result, SkellyError};

pub use user::{load_user_config, UserConfig};

/// Environment variable overriding the cache location.
pub const CACHE_DIR_ENV: &str = "SKELLY_CACHE_DIR";

/// Resolve the cache root.
///
/// `SKELLY_CACHE_DIR` wins, then `cache_dir` from the user config, then
/// `<user cache dir>/skelly/repos`.
pub fn cache_root(user: Option<&UserConfig>) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = user.and_then(|u| u.cache_dir.clone()) {
        return Ok(dir);
    }
    dirs::cache_dir()
        .map(|d| d.join("skelly").join("repos"))
        .ok_or(SkellyError::CacheDirUnavailable)
}
