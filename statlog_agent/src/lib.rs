//! statlog_agent: samples host CPU and memory on a fixed period and appends
//! each sample to a local SQLite database.

pub mod cli;
pub mod error;
pub mod metrics;
pub mod scheduler;
pub mod store;
pub mod types;

pub use error::StatError;
pub use metrics::{Sampler, SysinfoSampler};
pub use scheduler::{run, Session, TickOutcome, TickStats};
pub use store::{Recorder, SqliteRecorder, DEFAULT_STORE_PATH};
pub use types::Sample;
