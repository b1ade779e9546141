use crate::error::BenchError;
use crate::processor::MetricCollector;
use crate::reporter::unix_nanos;
use async_trait::async_trait;
use serde_json::json;
use sysinfo::System;

/// Samples CPU and memory usage of the host the benchmark runs on.
pub struct HostMetricCollector {
    system: System,
}

impl HostMetricCollector {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self { system }
    }
}

impl Default for HostMetricCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricCollector for HostMetricCollector {
    async fn collect_run_time_metrics(&mut self) -> Result<(i64, serde_json::Value), BenchError> {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        let total_memory = self.system.total_memory();
        if total_memory == 0 {
            return Err(BenchError::MetricCollectionFailed(
                "host memory information is unavailable".to_owned(),
            ));
        }
        let load = System::load_average();
        let metrics = json!({
            "cpu_usage_percent": self.system.global_cpu_usage(),
            "used_memory_bytes": self.system.used_memory(),
            "total_memory_bytes": total_memory,
            "load_average_one": load.one,
        });
        Ok((unix_nanos(), metrics))
    }
}
