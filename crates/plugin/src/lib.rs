//! Host-facing side of the RAM sampler.
//!
//! Panel hosts bind to [`HostAdapter`]; [`RamPlugin`] is the one
//! implementation, shared by every host. [`spawn_monitor`] is a ready-made
//! Tokio host that ticks a plugin on a timer and streams [`MonitorEvent`]s.

pub mod adapter;
pub mod monitor;
pub mod settings;

pub use adapter::{GraphSink, HostAdapter, RamPlugin, TickOutcome};
pub use monitor::{spawn_monitor, ChannelGraph, MonitorEvent, MonitorHandle, MonitoredPlugin};
pub use settings::{SettingKind, SettingSpec, SettingValue, SETTINGS};
