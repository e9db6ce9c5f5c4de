//! Metrics collection using sysinfo for statlog_agent.

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::Utc;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use tracing::debug;

use crate::error::{Result, StatError};
use crate::types::Sample;

/// Source of one CPU/memory sample per tick.
pub trait Sampler {
    fn read(&mut self) -> Result<Sample>;
}

/// Reads the host through one long-lived `sysinfo::System`.
///
/// CPU usage is the delta since the previous refresh. The constructor does
/// the baseline refresh, so as long as the first `read` comes at least
/// `sysinfo::MINIMUM_CPU_UPDATE_INTERVAL` later (one tick, >= 1s) every
/// recorded value is meaningful. `read` itself never sleeps.
pub struct SysinfoSampler {
    sys: System,
}

impl SysinfoSampler {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());
        let sys = System::new_with_specifics(refresh_kind);
        debug!(cores = sys.cpus().len(), "sysinfo sampler ready");
        Self { sys }
    }
}

impl Default for SysinfoSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for SysinfoSampler {
    fn read(&mut self) -> Result<Sample> {
        let sys = &mut self.sys;
        catch_unwind(AssertUnwindSafe(|| sys.refresh_cpu_usage()))
            .map_err(|e| StatError::metric("cpu", panic_message(e)))?;
        catch_unwind(AssertUnwindSafe(|| {
            sys.refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram())
        }))
        .map_err(|e| StatError::metric("memory", panic_message(e)))?;

        let per_core: Vec<f32> = sys.cpus().iter().map(|c| c.cpu_usage()).collect();
        let mem_total = sys.total_memory();
        if mem_total == 0 {
            return Err(StatError::metric("memory", "total memory reported as 0"));
        }
        let mem_used = sys.used_memory();

        Ok(Sample::from_readings(&per_core, mem_used, mem_total)?.at(Utc::now()))
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("sysinfo refresh panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("sysinfo refresh panicked: {s}")
    } else {
        "sysinfo refresh panicked".to_string()
    }
}
