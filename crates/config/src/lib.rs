pub mod error;
pub mod schema;
pub mod watcher;

pub use error::ConfigError;
pub use schema::DisplayConfig;
pub use watcher::ConfigWatcher;

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Load display settings from a TOML file. A file that doesn't exist yet
/// yields `DisplayConfig::default()`; any other read failure is an error.
pub fn load(path: impl AsRef<Path>) -> Result<DisplayConfig, ConfigError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(toml::from_str(&raw)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("No settings at '{}'; using defaults.", path.display());
            Ok(DisplayConfig::default())
        }
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// `$XDG_CONFIG_HOME/rammon/rammon.toml`, falling back to `~/.config`.
pub fn default_path() -> PathBuf {
    settings_path(std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME"))
}

// XDG says relative (or empty) values of the variable are to be ignored.
fn settings_path(xdg_config_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    let base = xdg_config_home
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .unwrap_or_else(|| {
            home.map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
    base.join("rammon").join("rammon.toml")
}
