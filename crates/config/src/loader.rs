use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::schema::GemboxConfig;

/// Config file name inside the config directory.
const CONFIG_FILENAME: &str = "gembox.toml";

/// Override for the config directory, set via `set_config_dir()`.
static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Set a custom config directory. When set, config discovery only looks in
/// this directory (the user-global path is skipped).
/// Can be called multiple times (e.g. in tests); each call replaces the
/// previous override.
pub fn set_config_dir(path: PathBuf) {
    if let Ok(mut guard) = CONFIG_DIR_OVERRIDE.lock() {
        *guard = Some(path);
    }
}

/// Clear the config directory override, restoring default discovery.
pub fn clear_config_dir() {
    if let Ok(mut guard) = CONFIG_DIR_OVERRIDE.lock() {
        *guard = None;
    }
}

fn config_dir_override() -> Option<PathBuf> {
    CONFIG_DIR_OVERRIDE.lock().ok().and_then(|g| g.clone())
}

/// Returns the config directory: override, or `~/.config/gembox/` on all platforms.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        return Some(dir);
    }
    home_dir().map(|h| h.join(".config").join("gembox"))
}

pub fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Load config from the given path.
pub fn load_config(path: &Path) -> anyhow::Result<GemboxConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    Ok(toml::from_str(&raw)?)
}

/// Discover and load `gembox.toml` from the config directory.
///
/// Returns `GemboxConfig::default()` if no config file is found or it fails
/// to parse.
pub fn discover_and_load() -> GemboxConfig {
    let Some(path) = config_dir().map(|d| d.join(CONFIG_FILENAME)) else {
        return GemboxConfig::default();
    };
    if !path.exists() {
        debug!("no config file found, using defaults");
        return GemboxConfig::default();
    }
    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            GemboxConfig::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_override_wins() {
        let tmp = tempfile::tempdir().unwrap();
        set_config_dir(tmp.path().to_path_buf());
        assert_eq!(config_dir().unwrap(), tmp.path());
        clear_config_dir();
    }

    #[test]
    fn load_config_parses_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("gembox.toml");
        std::fs::write(&path, "[accounts]\ndir = \"/srv/accounts\"\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(
            cfg.accounts.dir.as_deref(),
            Some(Path::new("/srv/accounts"))
        );
    }

    #[test]
    fn load_config_rejects_invalid_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("gembox.toml");
        std::fs::write(&path, "accounts = not valid").unwrap();
        assert!(load_config(&path).is_err());
    }
}
