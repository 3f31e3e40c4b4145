use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or apply display settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown setting '{0}'")]
    UnknownSetting(String),

    #[error("'{value}' is not a valid {kind} for '{key}'")]
    InvalidValue {
        key:   String,
        value: String,
        kind:  &'static str,
    },
}
