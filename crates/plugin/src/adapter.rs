use rammon_config::DisplayConfig;
use rammon_core::{GraphStyle, SampleHistory, SharedHistory, UtilizationSample};
use rammon_system::{MemorySource, ProcMeminfo, Sampler, SamplerState, Tick};
use tracing::{debug, info};

/// Whether the host should keep its periodic timer armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stop,
}

/// The lifecycle callbacks a panel host drives.
///
/// Each host wires these to its own timer, settings-changed signal and
/// teardown hook. Hosts must stop calling `on_tick` once it returns
/// [`TickOutcome::Stop`], and must stop their timer before `on_destroy`.
pub trait HostAdapter {
    /// Called on every timer expiry.
    fn on_tick(&mut self) -> TickOutcome;

    /// Called whenever the host's persisted settings change.
    fn on_settings_changed(&mut self, config: &DisplayConfig);

    /// Called once when the plugin is being torn down.
    fn on_destroy(&mut self);
}

/// The rendering collaborator: whatever draws the graph.
pub trait GraphSink {
    /// A new point was appended to the history.
    fn new_point(&mut self, _sample: &UtilizationSample) {}

    /// Graph size or colours changed.
    fn reload(&mut self, _size: usize, _style: GraphStyle) {}
}

/// For hosts that only read the [`SharedHistory`].
impl GraphSink for () {}

/// RAM usage graph plugin, shared by every host.
#[derive(Debug)]
pub struct RamPlugin<S = ProcMeminfo, G = ()> {
    /// `None` once destroyed; the memory source is released with it.
    sampler: Option<Sampler<S>>,
    history: SharedHistory,
    graph:   G,
    config:  DisplayConfig,
}

impl<S: MemorySource, G: GraphSink> RamPlugin<S, G> {
    pub fn new(source: S, config: DisplayConfig, mut graph: G) -> Self {
        let style = config.graph_style();
        let history = SharedHistory::new(SampleHistory::new(config.history_size, style));
        graph.reload(config.history_size, style);

        Self {
            sampler: Some(Sampler::new(source, history.clone(), config.show_percentage)),
            history,
            graph,
            config,
        }
    }

    pub fn history(&self) -> &SharedHistory {
        &self.history
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Sampler state, or `None` after [`on_destroy`](HostAdapter::on_destroy).
    pub fn state(&self) -> Option<SamplerState> {
        self.sampler.as_ref().map(Sampler::state)
    }

    pub fn is_destroyed(&self) -> bool {
        self.sampler.is_none()
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }
}

impl<S: MemorySource, G: GraphSink> HostAdapter for RamPlugin<S, G> {
    fn on_tick(&mut self) -> TickOutcome {
        let Some(sampler) = self.sampler.as_mut() else {
            return TickOutcome::Stop;
        };

        match sampler.tick() {
            Tick::Sampled(sample) => {
                self.graph.new_point(&sample);
                TickOutcome::Continue
            }
            Tick::Skipped => TickOutcome::Continue,
            Tick::Disabled => TickOutcome::Stop,
        }
    }

    fn on_settings_changed(&mut self, config: &DisplayConfig) {
        let style = config.graph_style();
        debug!(
            "Settings changed: show_percentage={}, history_size={}",
            config.show_percentage, config.history_size
        );

        if let Some(sampler) = self.sampler.as_mut() {
            sampler.set_show_percentage(config.show_percentage);
        }
        self.history.reconfigure(config.history_size, style);
        self.graph.reload(config.history_size, style);
        self.config = config.clone();
    }

    fn on_destroy(&mut self) {
        if self.sampler.take().is_some() {
            info!("RAM plugin destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rammon_core::{Colour, MemoryStats, ReadError};
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct RecordingGraph {
        points:  Vec<(f64, String)>,
        reloads: Vec<(usize, GraphStyle)>,
    }

    impl GraphSink for RecordingGraph {
        fn new_point(&mut self, sample: &UtilizationSample) {
            self.points.push((sample.ratio, sample.label.clone()));
        }

        fn reload(&mut self, size: usize, style: GraphStyle) {
            self.reloads.push((size, style));
        }
    }

    fn counting_source(
        reads: &Rc<Cell<u32>>,
        result: fn() -> Result<MemoryStats, ReadError>,
    ) -> impl FnMut() -> Result<MemoryStats, ReadError> {
        let reads = Rc::clone(reads);
        move || {
            reads.set(reads.get() + 1);
            result()
        }
    }

    fn healthy() -> Result<MemoryStats, ReadError> {
        Ok(MemoryStats { total_kb: 1_000_000, available_kb: 400_000 })
    }

    #[test]
    fn construction_configures_graph() {
        let plugin = RamPlugin::new(healthy, DisplayConfig::default(), RecordingGraph::default());
        assert_eq!(plugin.graph().reloads, vec![(36, GraphStyle::default())]);
        assert_eq!(plugin.state(), Some(SamplerState::Idle));
    }

    #[test]
    fn tick_feeds_graph_and_history() {
        let mut plugin = RamPlugin::new(healthy, DisplayConfig::default(), RecordingGraph::default());
        assert_eq!(plugin.on_tick(), TickOutcome::Continue);
        assert_eq!(plugin.graph().points.len(), 1);
        assert_eq!(plugin.graph().points[0].1, "M: 60%");
        assert_eq!(plugin.history().snapshot().len(), 1);
    }

    #[test]
    fn settings_change_reaches_sampler_history_and_graph() {
        let mut plugin = RamPlugin::new(healthy, DisplayConfig::default(), RecordingGraph::default());
        for _ in 0..5 {
            plugin.on_tick();
        }

        let config = DisplayConfig {
            show_percentage: false,
            foreground: "#ffffff".to_string(),
            history_size: 2,
            ..DisplayConfig::default()
        };
        plugin.on_settings_changed(&config);

        let history = plugin.history().snapshot();
        assert_eq!(history.len(), 2);
        assert_eq!(history.style().foreground, Colour { r: 1.0, g: 1.0, b: 1.0, a: 1.0 });
        assert_eq!(plugin.graph().reloads.last().map(|r| r.0), Some(2));

        plugin.on_tick();
        assert_eq!(plugin.graph().points.last().map(|p| p.1.as_str()), Some(""));
        assert!(!plugin.config().show_percentage);
    }

    #[test]
    fn parse_failure_stops_timer() {
        let reads = Rc::new(Cell::new(0));
        let source = counting_source(&reads, || Err(ReadError::MissingFields(vec!["MemAvailable"])));
        let mut plugin = RamPlugin::new(source, DisplayConfig::default(), ());

        assert_eq!(plugin.on_tick(), TickOutcome::Stop);
        assert_eq!(plugin.state(), Some(SamplerState::Disabled));
        assert!(plugin.history().snapshot().is_empty());
    }

    #[test]
    fn soft_failure_keeps_timer() {
        let reads = Rc::new(Cell::new(0));
        let source = counting_source(&reads, || {
            Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied).into())
        });
        let mut plugin = RamPlugin::new(source, DisplayConfig::default(), ());

        assert_eq!(plugin.on_tick(), TickOutcome::Continue);
        assert_eq!(plugin.on_tick(), TickOutcome::Continue);
        assert_eq!(reads.get(), 2);
        assert_eq!(plugin.state(), Some(SamplerState::Idle));
    }

    #[test]
    fn no_reads_after_destroy() {
        let reads = Rc::new(Cell::new(0));
        let mut plugin = RamPlugin::new(counting_source(&reads, healthy), DisplayConfig::default(), ());

        plugin.on_tick();
        plugin.on_destroy();
        assert_eq!(plugin.on_tick(), TickOutcome::Stop);
        assert_eq!(reads.get(), 1);
        assert!(plugin.is_destroyed());

        // Frozen history survives for a final redraw.
        assert_eq!(plugin.history().snapshot().len(), 1);
        plugin.on_destroy();
    }

    #[test]
    fn reads_real_file_format() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "MemTotal:       1000000 kB\nMemFree:         100 kB\nMemAvailable:   400000 kB").unwrap();
        let mut plugin = RamPlugin::new(ProcMeminfo::at(file.path()), DisplayConfig::default(), ());

        assert_eq!(plugin.on_tick(), TickOutcome::Continue);
        let snapshot = plugin.history().snapshot();
        assert_eq!(snapshot.latest().map(|s| s.label.as_str()), Some("M: 60%"));
    }
}
