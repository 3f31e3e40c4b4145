use thiserror::Error;

/// How the sampling loop should react to a failed read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Source temporarily unavailable: skip this tick, retry on the next.
    Soft,
    /// Source readable but not in the expected format: stop sampling.
    Parse,
}

/// Failure while acquiring memory statistics.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The memory source could not be opened or read.
    #[error("memory source unavailable: {source}")]
    Unavailable {
        #[from]
        source: std::io::Error,
    },

    /// One or more required fields never appeared (or were malformed).
    #[error("couldn't read all values: missing {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// `MemTotal` parsed as zero, which leaves the ratio undefined.
    #[error("MemTotal reported as 0 kB")]
    ZeroTotal,
}

impl ReadError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Unavailable { .. } => FailureKind::Soft,
            Self::MissingFields(_) | Self::ZeroTotal => FailureKind::Parse,
        }
    }
}
