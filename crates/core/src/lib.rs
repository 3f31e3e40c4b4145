pub mod colour;
pub mod error;
pub mod history;
pub mod sample;

pub use colour::Colour;
pub use error::{FailureKind, ReadError};
pub use history::{GraphStyle, SampleHistory, SharedHistory};
pub use sample::{format_label, MemoryStats, UtilizationSample};
