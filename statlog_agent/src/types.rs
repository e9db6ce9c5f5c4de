//! The one record this agent produces.
//! Keep this module minimal and stable: its fields mirror the `stats` table.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::{Result, StatError};

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    // None lets the store stamp the row at insertion time
    pub timestamp: Option<DateTime<Utc>>,
    pub cpu_usage: f64,
    pub memory_used: f64,
    pub memory_total: f64,
}

impl Sample {
    /// Build an untimestamped sample from raw OS readings: per-core CPU
    /// percentages and memory in bytes.
    pub fn from_readings(per_core: &[f32], used_bytes: u64, total_bytes: u64) -> Result<Self> {
        Ok(Self {
            timestamp: None,
            cpu_usage: mean_cpu(per_core)?,
            memory_used: bytes_to_gib(used_bytes),
            memory_total: bytes_to_gib(total_bytes),
        })
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CPU usage: {:.2}%, Memory used: {:.2} GiB, Memory total: {:.2} GiB",
            self.cpu_usage, self.memory_used, self.memory_total
        )
    }
}

/// Unweighted mean of per-core utilization. An empty list has no mean.
pub fn mean_cpu(per_core: &[f32]) -> Result<f64> {
    if per_core.is_empty() {
        return Err(StatError::metric("cpu", "no cpu cores reported"));
    }
    let sum: f64 = per_core.iter().map(|&v| f64::from(v)).sum();
    let mean = sum / per_core.len() as f64;
    if !mean.is_finite() {
        return Err(StatError::metric("cpu", format!("non-finite usage {mean}")));
    }
    Ok(mean)
}

pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB
}
