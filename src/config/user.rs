use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Result, SkellyError};
use crate::repo::SyncPolicy;

/// User-level configuration loaded from `~/.config/skelly/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct UserConfig {
    /// Where working copies and the manifest live.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    #[serde(default)]
    pub sync_policy: Option<SyncPolicy>,

    /// Reset cached repositories to `origin/<branch>` instead of the
    /// remote's advertised default branch.
    #[serde(default)]
    pub default_branch: Option<String>,
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SKELLY_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("skelly").join("config.toml"))
}

/// Load user configuration.
///
/// Returns `Ok(None)` if the config file does not exist.
/// Returns `Err` if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<Option<UserConfig>> {
    let path = match config_path() {
        Some(p) => p,
        None => return Ok(None),
    };

    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| SkellyError::Io {
        context: format!("reading user config {}", path.display()),
        source: e,
    })?;

    let config: UserConfig =
        toml::from_str(&content).map_err(|e| SkellyError::ConfigParse { path, source: e })?;

    Ok(Some(config))
}
