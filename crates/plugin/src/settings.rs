//! Declarative description of the user-visible settings.
//!
//! Hosts render their configuration dialogs from [`SETTINGS`] and write
//! edited values back with [`apply`]; the sampler itself never sees this.

use rammon_config::{schema, ConfigError, DisplayConfig};
use rammon_core::Colour;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Bool,
    Colour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Colour(&'static str),
}

impl SettingValue {
    pub fn kind(&self) -> SettingKind {
        match self {
            Self::Bool(_) => SettingKind::Bool,
            Self::Colour(_) => SettingKind::Colour,
        }
    }
}

/// One entry of the settings schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingSpec {
    /// Key in the persisted settings, e.g. `"show_percentage"`.
    pub key:         &'static str,
    pub kind:        SettingKind,
    pub default:     SettingValue,
    /// Dialog label.
    pub description: &'static str,
}

pub static SETTINGS: [SettingSpec; 3] = [
    SettingSpec {
        key:         "show_percentage",
        kind:        SettingKind::Bool,
        default:     SettingValue::Bool(true),
        description: "Show usage as percentage",
    },
    SettingSpec {
        key:         "foreground",
        kind:        SettingKind::Colour,
        default:     SettingValue::Colour(schema::DEFAULT_FOREGROUND),
        description: "Foreground colour",
    },
    SettingSpec {
        key:         "background",
        kind:        SettingKind::Colour,
        default:     SettingValue::Colour(schema::DEFAULT_BACKGROUND),
        description: "Background colour",
    },
];

pub fn lookup(key: &str) -> Option<&'static SettingSpec> {
    SETTINGS.iter().find(|spec| spec.key == key)
}

/// Write a value edited in a host dialog into `config`.
///
/// Values are validated against the schema kind; colours must parse.
pub fn apply(config: &mut DisplayConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let spec = lookup(key).ok_or_else(|| ConfigError::UnknownSetting(key.to_string()))?;
    let value = value.trim();
    let invalid = |kind| ConfigError::InvalidValue {
        key:   key.to_string(),
        value: value.to_string(),
        kind,
    };

    match spec.kind {
        SettingKind::Bool => {
            let flag = match value {
                "true" | "1" | "yes" | "on" => true,
                "false" | "0" | "no" | "off" => false,
                _ => return Err(invalid("boolean")),
            };
            config.show_percentage = flag;
        }
        SettingKind::Colour => {
            if Colour::parse(value).is_none() {
                return Err(invalid("colour"));
            }
            match key {
                "foreground" => config.foreground = value.to_string(),
                _ => config.background = value.to_string(),
            }
        }
    }
    Ok(())
}
