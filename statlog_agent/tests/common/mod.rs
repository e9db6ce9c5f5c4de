//! Shared fakes and read-back helpers for the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, Row};
use statlog_agent::error::Result;
use statlog_agent::{Recorder, Sample, Sampler, StatError};

pub const GIB: u64 = 1024 * 1024 * 1024;

/// Always reports cores at 10% and 20%, 4 of 16 GiB used.
pub struct FixedSampler;

impl Sampler for FixedSampler {
    fn read(&mut self) -> Result<Sample> {
        Sample::from_readings(&[10.0, 20.0], 4 * GIB, 16 * GIB)
    }
}

/// Plays back a fixed script of reads, then keeps succeeding.
pub struct ScriptedSampler {
    script: VecDeque<bool>,
}

impl ScriptedSampler {
    /// `true` = successful read, `false` = MetricUnavailable
    pub fn new(script: &[bool]) -> Self {
        Self {
            script: script.iter().copied().collect(),
        }
    }
}

impl Sampler for ScriptedSampler {
    fn read(&mut self) -> Result<Sample> {
        match self.script.pop_front() {
            Some(false) => Err(StatError::MetricUnavailable {
                metric: "cpu",
                reason: "simulated outage".into(),
            }),
            _ => FixedSampler.read(),
        }
    }
}

/// Keeps appended samples in memory.
#[derive(Default)]
pub struct VecRecorder {
    pub rows: Vec<Sample>,
}

impl Recorder for VecRecorder {
    async fn append(&mut self, sample: &Sample) -> Result<()> {
        self.rows.push(sample.clone());
        Ok(())
    }
}

/// Rejects every write.
pub struct BrokenRecorder;

impl Recorder for BrokenRecorder {
    async fn append(&mut self, _sample: &Sample) -> Result<()> {
        Err(StatError::WriteFailure(sqlx::Error::PoolClosed))
    }
}

pub struct StoredRow {
    pub timestamp: Option<String>,
    pub cpu_usage: f64,
    pub memory_used: f64,
    pub memory_total: f64,
}

pub async fn open_readback(path: &Path) -> SqliteConnection {
    let opts = SqliteConnectOptions::new().filename(path);
    SqliteConnection::connect_with(&opts)
        .await
        .expect("open read-back connection")
}

pub async fn count_rows(path: &Path) -> i64 {
    let mut conn = open_readback(path).await;
    let row = sqlx::query("SELECT COUNT(*) AS n FROM stats")
        .fetch_one(&mut conn)
        .await
        .expect("count rows");
    row.try_get("n").expect("n column")
}

pub async fn read_rows(path: &Path) -> Vec<StoredRow> {
    let mut conn = open_readback(path).await;
    let rows = sqlx::query(
        "SELECT CAST(timestamp AS TEXT) AS ts, cpu_usage, memory_used, memory_total
         FROM stats ORDER BY rowid",
    )
    .fetch_all(&mut conn)
    .await
    .expect("select rows");
    rows.iter()
        .map(|r| StoredRow {
            timestamp: r.try_get("ts").expect("ts"),
            cpu_usage: r.try_get("cpu_usage").expect("cpu_usage"),
            memory_used: r.try_get("memory_used").expect("memory_used"),
            memory_total: r.try_get("memory_total").expect("memory_total"),
        })
        .collect()
}
