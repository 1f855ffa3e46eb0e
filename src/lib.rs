//! Latency, memory and security-probe benchmarks for AEAD schemes used to
//! protect unlock commands sent to bike locks.

pub mod alloc_track;
pub mod config;
pub mod crypto;
pub mod error;
pub mod export;
pub mod fixture;
pub mod measure;
pub mod probes;
pub mod report;
pub mod runner;
pub mod schemes;

pub use config::BenchConfig;
pub use crypto::{AeadScheme, Algorithm, Sealed};
pub use error::{AeadError, BenchError, Result};
pub use report::{BenchmarkReport, BenchmarkRun, ComparativeReport, Delta, ReportEntry};
pub use runner::Runner;

#[cfg(feature = "track-alloc")]
#[global_allocator]
static ALLOC: alloc_track::TrackingAllocator = alloc_track::TrackingAllocator;
