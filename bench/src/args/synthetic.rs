use super::defaults::*;
use crate::processors::synthetic::SyntheticBackendConfig;
use crate::run_config::RunConfiguration;
use clap::Args;
use std::time::Duration;

/// Behaviour of the built-in synthetic backend
#[derive(Args, Debug, Clone)]
pub struct SyntheticArgs {
    /// Simulated latency of one query, e.g. "250us", "2ms"
    #[arg(long = "synthetic-latency", default_value = DEFAULT_SYNTHETIC_LATENCY, value_parser = humantime::parse_duration, env = "AIBENCH_SYNTHETIC_LATENCY")]
    pub latency: Duration,

    /// Upper bound of the random extra latency added to every query
    #[arg(long = "synthetic-jitter", default_value = DEFAULT_SYNTHETIC_JITTER, value_parser = humantime::parse_duration, env = "AIBENCH_SYNTHETIC_JITTER")]
    pub jitter: Duration,

    /// Queries slower than this are reported as timed out, "0" disables it
    #[arg(long = "synthetic-timeout", default_value = DEFAULT_SYNTHETIC_TIMEOUT, value_parser = humantime::parse_duration, env = "AIBENCH_SYNTHETIC_TIMEOUT")]
    pub timeout: Duration,

    /// Number of pipeline stages reported as partial measurements
    #[arg(long = "synthetic-stages", default_value_t = DEFAULT_SYNTHETIC_STAGES, env = "AIBENCH_SYNTHETIC_STAGES")]
    pub stages: u32,

    /// Fail every n-th query, 0 never fails
    #[arg(long = "synthetic-failure-every", default_value_t = DEFAULT_SYNTHETIC_FAILURE_EVERY, env = "AIBENCH_SYNTHETIC_FAILURE_EVERY")]
    pub failure_every: u64,
}

impl SyntheticArgs {
    pub fn backend_config(
        &self,
        config: &RunConfiguration,
        commands_per_record: u64,
    ) -> SyntheticBackendConfig {
        SyntheticBackendConfig {
            latency: self.latency,
            jitter: self.jitter,
            timeout: self.timeout,
            stages: self.stages,
            failure_every: self.failure_every,
            commands_per_record,
            items_per_record: config.items_per_record,
            seed: config.seed,
        }
    }
}
