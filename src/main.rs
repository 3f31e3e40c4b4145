//! rammon — headless host for the RAM usage sampler.
//!
//! Samples `/proc/meminfo` on a timer, logs each point, and live-reloads
//! `~/.config/rammon/rammon.toml`.
//!
//! Run with:  `RUST_LOG=info rammon`

use anyhow::Result;
use rammon_config::{default_path, load as load_config, ConfigWatcher, DisplayConfig};
use rammon_plugin::{spawn_monitor, MonitorEvent};
use rammon_system::ProcMeminfo;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging — RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("rammon v{} starting", env!("CARGO_PKG_VERSION"));

    let path = default_path();
    let config = load_config(&path).unwrap_or_else(|e| {
        warn!("{e}; using defaults.");
        DisplayConfig::default()
    });

    let (monitor, mut events) = spawn_monitor(ProcMeminfo::new(), config);
    let (_watcher, mut changes) = ConfigWatcher::spawn(&path);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; shutting down");
                break;
            }

            Some(()) = changes.recv() => match load_config(&path) {
                Ok(cfg) => {
                    info!("Settings reloaded");
                    monitor.update_settings(cfg).await;
                }
                Err(e) => warn!("Settings reload failed: {e}"),
            },

            event = events.recv() => match event {
                Some(MonitorEvent::Sample(sample)) => info!(
                    ratio = sample.ratio,
                    total_kb = sample.total_kb,
                    "{}",
                    if sample.label.is_empty() { "sample" } else { sample.label.as_str() }
                ),
                Some(MonitorEvent::Reconfigured { size, style }) => {
                    debug!("Graph reconfigured: {size} samples, {style:?}");
                }
                Some(MonitorEvent::Disabled) => {
                    warn!("Sampling disabled; display frozen at last value");
                }
                None => break,
            },
        }
    }

    let plugin = monitor.shutdown().await?;
    if let Some(last) = plugin.history().snapshot().latest() {
        info!("Last sample: {:.1}% of {} kB", last.ratio * 100.0, last.total_kb);
    }
    Ok(())
}
