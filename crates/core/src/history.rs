use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{colour::Colour, sample::UtilizationSample};

/// Rendering parameters passed through to whoever draws the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphStyle {
    pub foreground: Colour,
    pub background: Colour,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            foreground: Colour::DARK_GRAY,
            background: Colour::LIGHT_GRAY,
        }
    }
}

/// Rolling history of utilization samples, oldest first.
///
/// Capacity is always at least one; a request for zero is clamped.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    samples:  VecDeque<UtilizationSample>,
    capacity: usize,
    style:    GraphStyle,
}

impl SampleHistory {
    pub fn new(capacity: usize, style: GraphStyle) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            style,
        }
    }

    /// Push a new sample, evicting the oldest if at capacity.
    pub fn push(&mut self, sample: UtilizationSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Change the graph size and colours. Shrinking drops the oldest samples.
    pub fn reconfigure(&mut self, capacity: usize, style: GraphStyle) {
        self.capacity = capacity.max(1);
        self.style = style;
        if self.samples.len() > self.capacity {
            let excess = self.samples.len() - self.capacity;
            self.samples.drain(..excess);
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &UtilizationSample> + ExactSizeIterator {
        self.samples.iter()
    }

    /// Ratios in time order, convenient for plotting.
    pub fn ratios(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.ratio).collect()
    }

    /// Most recent sample; stays put after sampling is disabled.
    pub fn latest(&self) -> Option<&UtilizationSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn style(&self) -> GraphStyle {
        self.style
    }
}

/// A [`SampleHistory`] shared between the sampler and a renderer running
/// on another task. Readers take a [`snapshot`](Self::snapshot) instead of
/// holding the lock.
#[derive(Debug, Clone)]
pub struct SharedHistory(Arc<Mutex<SampleHistory>>);

impl SharedHistory {
    pub fn new(history: SampleHistory) -> Self {
        Self(Arc::new(Mutex::new(history)))
    }

    pub fn push(&self, sample: UtilizationSample) {
        self.lock().push(sample);
    }

    pub fn reconfigure(&self, capacity: usize, style: GraphStyle) {
        self.lock().reconfigure(capacity, style);
    }

    /// Copy of the current history, safe to read while sampling continues.
    pub fn snapshot(&self) -> SampleHistory {
        self.lock().clone()
    }

    // A panic while holding the lock cannot leave the deque half-updated,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, SampleHistory> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
