use crate::error::BenchError;
use std::path::PathBuf;
use std::time::Duration;

/// Knobs of one run, resolved and validated once, read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfiguration {
    pub workers: usize,
    /// Records to read, 0 means the whole input
    pub limit: u64,
    /// Aggregate request rate cap, 0 means unlimited
    pub limit_rps: u64,
    pub burn_in: u64,
    /// Zero disables periodic reporting
    pub reporting_period: Duration,
    pub seed: u64,
    pub debug: u8,
    pub ignore_errors: bool,
    pub print_responses: bool,
    pub prewarm_queries: bool,
    pub use_reference_data_redis: bool,
    pub use_reference_data_mysql: bool,
    pub metadata_autobatching: i64,
    pub record_size: usize,
    pub items_per_record: u64,
    pub test_description: String,
    pub input: Option<PathBuf>,
    pub json_out_file: Option<PathBuf>,
    pub hdr_latency_file: Option<PathBuf>,
    pub cpu_profile: Option<PathBuf>,
    pub mem_profile: Option<PathBuf>,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            workers: 1,
            limit: 0,
            limit_rps: 0,
            burn_in: 0,
            reporting_period: Duration::from_secs(1),
            seed: 0,
            debug: 0,
            ignore_errors: false,
            print_responses: false,
            prewarm_queries: false,
            use_reference_data_redis: false,
            use_reference_data_mysql: false,
            metadata_autobatching: -1,
            record_size: 64,
            items_per_record: 1,
            test_description: String::new(),
            input: None,
            json_out_file: None,
            hdr_latency_file: None,
            cpu_profile: None,
            mem_profile: None,
        }
    }
}

impl RunConfiguration {
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.workers == 0 {
            return Err(BenchError::InvalidConfiguration(
                "must have at least one worker".to_owned(),
            ));
        }
        if self.limit > 0 && self.burn_in > self.limit {
            return Err(BenchError::InvalidConfiguration(format!(
                "burn-in ({}) is larger than the query limit ({})",
                self.burn_in, self.limit
            )));
        }
        if self.record_size == 0 {
            return Err(BenchError::InvalidConfiguration(
                "record size must be greater than zero".to_owned(),
            ));
        }
        if self.items_per_record == 0 {
            return Err(BenchError::InvalidConfiguration(
                "items per record must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn reporting_enabled(&self) -> bool {
        !self.reporting_period.is_zero()
    }
}
