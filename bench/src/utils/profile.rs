use super::write_output_file;
use crate::error::BenchError;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct CpuProfile {
    pub pid: u32,
    pub wall_time_secs: f64,
    pub process_run_time_secs: u64,
    pub average_cpu_usage_percent: f32,
    pub cpu_cores: usize,
}

#[derive(Debug, Serialize)]
pub struct MemoryProfile {
    pub pid: u32,
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
}

/// Samples this process through `sysinfo`.
///
/// The first refresh happens on `start`, so the CPU usage read at the end
/// covers the whole run.
pub struct ProcessProfiler {
    system: System,
    pid: Pid,
    started: Instant,
}

impl ProcessProfiler {
    pub fn start() -> Option<Self> {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(error) => {
                warn!("Process profiling is unavailable: {error}");
                return None;
            }
        };
        let mut system = System::new();
        system.refresh_cpu_all();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        Some(Self {
            system,
            pid,
            started: Instant::now(),
        })
    }

    fn refresh(&mut self) {
        self.system.refresh_cpu_all();
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
    }

    pub fn cpu_profile(&mut self) -> CpuProfile {
        self.refresh();
        let (run_time, cpu_usage) = self
            .system
            .process(self.pid)
            .map(|process| (process.run_time(), process.cpu_usage()))
            .unwrap_or_default();
        CpuProfile {
            pid: self.pid.as_u32(),
            wall_time_secs: self.started.elapsed().as_secs_f64(),
            process_run_time_secs: run_time,
            average_cpu_usage_percent: cpu_usage,
            cpu_cores: self.system.cpus().len(),
        }
    }

    pub fn memory_profile(&mut self) -> MemoryProfile {
        self.refresh();
        let (resident_bytes, virtual_bytes) = self
            .system
            .process(self.pid)
            .map(|process| (process.memory(), process.virtual_memory()))
            .unwrap_or_default();
        MemoryProfile {
            pid: self.pid.as_u32(),
            resident_bytes,
            virtual_bytes,
        }
    }

    pub fn write_cpu_profile(&mut self, path: &Path) -> Result<(), BenchError> {
        let profile = self.cpu_profile();
        info!("Saving CPU profile to {}", path.display());
        write_output_file(path, serde_json::to_vec_pretty(&profile)?)
    }

    pub fn write_memory_profile(&mut self, path: &Path) -> Result<(), BenchError> {
        let profile = self.memory_profile();
        info!("Saving memory profile to {}", path.display());
        write_output_file(path, serde_json::to_vec_pretty(&profile)?)
    }
}
