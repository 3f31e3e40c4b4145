use chrono::{DateTime, Local};

use crate::error::ReadError;

/// Prefix tag shown in front of the percentage label.
pub const LABEL_TAG: &str = "M:";

/// Raw figures from one read of the memory source, in kB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    /// Total addressable memory (`MemTotal`).
    pub total_kb: u64,
    /// Memory available for new allocations (`MemAvailable`).
    pub available_kb: u64,
}

impl MemoryStats {
    /// Fraction of memory in use, in `[0, 1]`.
    ///
    /// "Used" is `MemTotal - MemAvailable`, not `MemTotal - MemFree`: page
    /// cache, buffers and reclaimable slab (`SReclaimable`) are released as
    /// soon as an application needs them, so they count as available. This
    /// matches what `free(1)` from procps reports and gives a noticeably
    /// lower figure than naive free-memory maths.
    ///
    /// A `MemAvailable` larger than `MemTotal` saturates to `0.0`.
    pub fn utilization(&self) -> Result<f64, ReadError> {
        if self.total_kb == 0 {
            return Err(ReadError::ZeroTotal);
        }
        let used = self.total_kb.saturating_sub(self.available_kb);
        Ok(used as f64 / self.total_kb as f64)
    }
}

/// One derived utilization measurement, ready for the graph.
#[derive(Debug, Clone)]
pub struct UtilizationSample {
    /// Used fraction of total memory, in `[0, 1]`.
    pub ratio: f64,
    /// Overlay text, e.g. `"M: 63%"`; empty when percentages are hidden.
    pub label: String,
    /// `MemTotal` at the time of the sample; the graph's full-scale value.
    pub total_kb: u64,
    pub taken_at: DateTime<Local>,
}

impl UtilizationSample {
    pub fn from_stats(stats: MemoryStats, show_percentage: bool) -> Result<Self, ReadError> {
        let ratio = stats.utilization()?;
        Ok(Self {
            ratio,
            label: format_label(ratio, show_percentage),
            total_kb: stats.total_kb,
            taken_at: Local::now(),
        })
    }
}

/// Render `ratio` as a fixed-width percentage label such as `"M: 63%"`.
///
/// The percentage is rounded half away from zero (`0.625` → `63`) and
/// right-aligned in three columns so the label width never changes between
/// `"M:  5%"` and `"M:100%"`. Returns an empty string when `show_percentage`
/// is off.
pub fn format_label(ratio: f64, show_percentage: bool) -> String {
    if !show_percentage {
        return String::new();
    }
    let percent = (ratio * 100.0).round();
    format!("{LABEL_TAG}{percent:>3.0}%")
}
