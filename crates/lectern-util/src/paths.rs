//! Default paths for lectern components
//!
//! Provides centralized path defaults that all crates can use.
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/lectern/lectern.toml` or `~/.config/lectern/lectern.toml`
//! - Data: `$XDG_DATA_HOME/lectern` or `~/.local/share/lectern`
//! - Logs: `$XDG_STATE_HOME/lectern` or `~/.local/state/lectern`

use std::path::PathBuf;

/// Environment variable for overriding the config path
pub const LECTERN_CONFIG_ENV: &str = "LECTERN_CONFIG";

/// Environment variable for overriding the data directory
pub const LECTERN_DATA_DIR_ENV: &str = "LECTERN_DATA_DIR";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "lectern.toml";

/// Application subdirectory name
const APP_DIR: &str = "lectern";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$LECTERN_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/lectern/lectern.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/lectern/lectern.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(LECTERN_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    config_path_without_env()
}

/// Get the config path without checking the LECTERN_CONFIG env var.
pub fn config_path_without_env() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/tmp").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$LECTERN_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/lectern` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/lectern` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(LECTERN_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking the LECTERN_DATA_DIR env var.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Get the default log directory.
///
/// Order of precedence:
/// 1. `$XDG_STATE_HOME/lectern` (if XDG_STATE_HOME is set)
/// 2. `~/.local/state/lectern` (fallback)
pub fn default_log_dir() -> PathBuf {
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(state_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("state")
            .join(APP_DIR);
    }

    PathBuf::from("/tmp").join(APP_DIR).join("logs")
}
