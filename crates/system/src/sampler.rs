//! Per-tick orchestration: read, derive, label, push.

use rammon_core::{FailureKind, SharedHistory, UtilizationSample};
use tracing::{debug, warn};

use crate::meminfo::{MemorySource, ProcMeminfo};

/// Where the sampler is in its tick cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    /// Waiting for the next tick.
    Idle,
    /// A read is in progress.
    Sampling,
    /// The source is not in a usable format. Terminal.
    Disabled,
}

/// What happened on one tick.
#[derive(Debug, Clone)]
pub enum Tick {
    /// A sample was derived and pushed to the history.
    Sampled(UtilizationSample),
    /// The source was unavailable; nothing pushed, retry next tick.
    Skipped,
    /// Sampling has stopped for good; the host should cancel its timer.
    Disabled,
}

impl Tick {
    /// Whether the host should keep its timer armed.
    pub fn should_continue(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// Drives a [`MemorySource`] into a [`SharedHistory`] one tick at a time.
///
/// No retries happen within a tick. Once the source fails with a
/// [`FailureKind::Parse`] error the sampler is [`SamplerState::Disabled`]
/// and never reads again; the history keeps whatever it last held.
#[derive(Debug)]
pub struct Sampler<S = ProcMeminfo> {
    source:          S,
    history:         SharedHistory,
    state:           SamplerState,
    show_percentage: bool,
}

impl<S: MemorySource> Sampler<S> {
    pub fn new(source: S, history: SharedHistory, show_percentage: bool) -> Self {
        Self {
            source,
            history,
            state: SamplerState::Idle,
            show_percentage,
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn history(&self) -> &SharedHistory {
        &self.history
    }

    /// Takes effect from the next sample; samples already pushed keep their label.
    pub fn set_show_percentage(&mut self, show_percentage: bool) {
        self.show_percentage = show_percentage;
    }

    pub fn tick(&mut self) -> Tick {
        if self.state == SamplerState::Disabled {
            return Tick::Disabled;
        }

        self.state = SamplerState::Sampling;
        let result = self
            .source
            .read()
            .and_then(|stats| UtilizationSample::from_stats(stats, self.show_percentage));

        match result {
            Ok(sample) => {
                self.history.push(sample.clone());
                self.state = SamplerState::Idle;
                Tick::Sampled(sample)
            }
            Err(e) if e.kind() == FailureKind::Soft => {
                debug!("Memory source unavailable, retrying next tick: {e}");
                self.state = SamplerState::Idle;
                Tick::Skipped
            }
            Err(e) => {
                warn!("Memory sampling disabled: {e}");
                self.state = SamplerState::Disabled;
                Tick::Disabled
            }
        }
    }
}
