use std::time::Duration;

use rammon_core::{Colour, GraphStyle};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Sampling period used by both panel hosts.
pub const DEFAULT_INTERVAL_MS: u64 = 1_500;
/// Shortest period accepted from a config file.
pub const MIN_INTERVAL_MS: u64 = 100;
/// Graph width in samples when the host doesn't say otherwise.
pub const DEFAULT_HISTORY_SIZE: usize = 36;

pub const DEFAULT_FOREGROUND: &str = "dark gray";
pub const DEFAULT_BACKGROUND: &str = "light gray";

/// Display settings parsed from `rammon.toml`.
///
/// Colours are kept as written and only resolved by [`graph_style`](Self::graph_style),
/// so a bad value degrades to the default instead of rejecting the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Overlay the usage percentage (`"M: 63%"`) on the graph.
    pub show_percentage: bool,
    /// Graph line colour (hex, e.g. `"#cba6f7"`, or `"dark gray"`).
    pub foreground: String,
    /// Graph fill colour.
    pub background: String,
    /// Number of samples the graph keeps.
    pub history_size: usize,
    /// Sampling period in milliseconds.
    pub interval_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_percentage: true,
            foreground:      DEFAULT_FOREGROUND.to_string(),
            background:      DEFAULT_BACKGROUND.to_string(),
            history_size:    DEFAULT_HISTORY_SIZE,
            interval_ms:     DEFAULT_INTERVAL_MS,
        }
    }
}

impl DisplayConfig {
    /// Resolve the colour settings, falling back per field on parse errors.
    pub fn graph_style(&self) -> GraphStyle {
        GraphStyle {
            foreground: resolve_colour("foreground", &self.foreground, Colour::DARK_GRAY),
            background: resolve_colour("background", &self.background, Colour::LIGHT_GRAY),
        }
    }

    /// Sampling period, never shorter than [`MIN_INTERVAL_MS`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(MIN_INTERVAL_MS))
    }
}

fn resolve_colour(key: &str, value: &str, fallback: Colour) -> Colour {
    Colour::parse(value).unwrap_or_else(|| {
        warn!("Invalid {key} colour '{value}'; using default.");
        fallback
    })
}
