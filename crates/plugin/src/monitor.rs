//! A Tokio host for [`RamPlugin`].

use rammon_config::DisplayConfig;
use rammon_core::{GraphStyle, SharedHistory, UtilizationSample};
use rammon_system::MemorySource;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::adapter::{GraphSink, HostAdapter, RamPlugin, TickOutcome};

/// What the monitor tells the rendering side.
///
/// `Sample` and `Reconfigured` are best-effort: a renderer that falls behind
/// misses redraw hints, but every accepted sample is still in the
/// [`SharedHistory`]. `Disabled` is always delivered.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// A new point for the graph.
    Sample(UtilizationSample),
    /// The graph was resized or recoloured.
    Reconfigured { size: usize, style: GraphStyle },
    /// Sampling stopped for good; the last value stays on screen.
    Disabled,
}

/// Forwards graph callbacks into the monitor's event channel.
#[derive(Debug)]
pub struct ChannelGraph(mpsc::Sender<MonitorEvent>);

impl ChannelGraph {
    fn sender(&self) -> mpsc::Sender<MonitorEvent> {
        self.0.clone()
    }

    fn send(&self, event: MonitorEvent) {
        // A slow renderer only misses redraws; the history still has the data.
        if let Err(e) = self.0.try_send(event) {
            trace!("Dropped monitor event: {e}");
        }
    }
}

impl GraphSink for ChannelGraph {
    fn new_point(&mut self, sample: &UtilizationSample) {
        self.send(MonitorEvent::Sample(sample.clone()));
    }

    fn reload(&mut self, size: usize, style: GraphStyle) {
        self.send(MonitorEvent::Reconfigured { size, style });
    }
}

pub type MonitoredPlugin<S> = RamPlugin<S, ChannelGraph>;

/// Handle to a running monitor task.
///
/// Dropping the handle also stops the task.
pub struct MonitorHandle<S> {
    settings: mpsc::Sender<DisplayConfig>,
    shutdown: oneshot::Sender<()>,
    task:     JoinHandle<MonitoredPlugin<S>>,
    history:  SharedHistory,
}

impl<S> MonitorHandle<S> {
    /// The plugin's history, for renderers that draw from snapshots.
    pub fn history(&self) -> &SharedHistory {
        &self.history
    }

    /// Hand new settings to the plugin. Ignored once the task has exited.
    pub async fn update_settings(&self, config: DisplayConfig) {
        if self.settings.send(config).await.is_err() {
            debug!("Monitor already stopped; settings update ignored");
        }
    }

    /// Stop the timer, wait for any in-flight tick, then destroy the plugin.
    ///
    /// Returns the destroyed plugin so callers can inspect its final state.
    pub async fn shutdown(self) -> Result<MonitoredPlugin<S>, JoinError> {
        let _ = self.shutdown.send(());
        self.task.await
    }
}

/// Spawn a task that ticks a [`RamPlugin`] every `config.interval()` and
/// streams [`MonitorEvent`]s through the returned channel.
///
/// The first tick fires immediately. After a parse failure the timer is
/// dropped but the task stays alive for settings changes until shutdown.
pub fn spawn_monitor<S>(source: S, config: DisplayConfig) -> (MonitorHandle<S>, mpsc::Receiver<MonitorEvent>)
where
    S: MemorySource + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    let (settings_tx, settings_rx) = mpsc::channel(4);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let plugin = RamPlugin::new(source, config, ChannelGraph(tx));
    let history = plugin.history().clone();
    let task = tokio::spawn(run(plugin, settings_rx, shutdown_rx));

    let handle = MonitorHandle {
        settings: settings_tx,
        shutdown: shutdown_tx,
        task,
        history,
    };
    (handle, rx)
}

async fn run<S: MemorySource>(
    mut plugin: MonitoredPlugin<S>,
    mut settings: mpsc::Receiver<DisplayConfig>,
    mut shutdown: oneshot::Receiver<()>,
) -> MonitoredPlugin<S> {
    let mut period = plugin.config().interval();
    let mut ticker = new_ticker(Instant::now(), period);
    let mut ticking = true;
    let mut disabled_pending = false;
    let notify = plugin.graph().sender();

    info!("RAM monitor started ({} ms interval)", period.as_millis());

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,

            Some(config) = settings.recv() => {
                plugin.on_settings_changed(&config);
                let new_period = plugin.config().interval();
                if new_period != period {
                    period = new_period;
                    ticker = new_ticker(Instant::now() + period, period);
                    debug!("Sampling interval now {} ms", period.as_millis());
                }
            }

            _ = ticker.tick(), if ticking => {
                if plugin.on_tick() == TickOutcome::Stop {
                    ticking = false;
                    disabled_pending = true;
                    warn!("RAM monitor stopped sampling; keeping last value");
                }
            }

            // Waits for room in the channel without holding up shutdown or
            // settings changes.
            sent = notify.send(MonitorEvent::Disabled), if disabled_pending => {
                disabled_pending = false;
                if sent.is_err() {
                    debug!("Renderer gone before sampling-disabled notice");
                }
            }
        }
    }

    // The timer is gone before the plugin is torn down, so no tick can
    // observe a destroyed plugin.
    drop(ticker);
    drop(notify);
    plugin.on_destroy();
    info!("RAM monitor stopped");
    plugin
}

fn new_ticker(start: Instant, period: std::time::Duration) -> Interval {
    let mut ticker = time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
