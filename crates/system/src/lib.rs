pub mod meminfo;
pub mod sampler;

pub use meminfo::{parse_meminfo, MemorySource, ProcMeminfo, MEMINFO_PATH};
pub use sampler::{Sampler, SamplerState, Tick};
