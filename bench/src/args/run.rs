use super::defaults::*;
use super::synthetic::SyntheticArgs;
use crate::run_config::RunConfiguration;
use crate::utils::resolve_seed;
use clap::Args;
use std::num::{NonZeroU32, NonZeroU64, NonZeroUsize};
use std::path::PathBuf;
use std::time::Duration;

/// Knobs shared by the inference and load benchmarks
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Number of concurrent workers
    #[arg(long, default_value_t = DEFAULT_WORKERS, env = "AIBENCH_WORKERS")]
    pub workers: NonZeroU32,

    /// Limit the number of records to send, 0 = no limit
    #[arg(long, visible_alias = "max-inserts", default_value_t = DEFAULT_MAX_QUERIES, env = "AIBENCH_MAX_QUERIES")]
    pub max_queries: u64,

    /// Limit the aggregate request rate, 0 = no limit
    #[arg(long, default_value_t = DEFAULT_LIMIT_RPS, env = "AIBENCH_LIMIT_RPS")]
    pub limit_rps: u64,

    /// Number of measurements to ignore before collecting statistics
    #[arg(long, default_value_t = DEFAULT_BURN_IN, env = "AIBENCH_BURN_IN")]
    pub burn_in: u64,

    /// Period of the progress report, "0" disables it
    #[arg(long, default_value = DEFAULT_REPORTING_PERIOD, value_parser = humantime::parse_duration, env = "AIBENCH_REPORTING_PERIOD")]
    pub reporting_period: Duration,

    /// PRNG seed, 0 uses the current time
    #[arg(long, default_value_t = DEFAULT_SEED, env = "AIBENCH_SEED")]
    pub seed: u64,

    /// Log query errors and continue instead of aborting the run
    #[arg(long, env = "AIBENCH_IGNORE_ERRORS")]
    pub ignore_errors: bool,

    /// Log every backend response
    #[arg(long, env = "AIBENCH_PRINT_RESPONSES")]
    pub print_responses: bool,

    /// Input file, stdin when not set
    #[arg(long, env = "AIBENCH_FILE")]
    pub file: Option<PathBuf>,

    /// Width of one input record in bytes
    #[arg(long, default_value_t = DEFAULT_RECORD_SIZE, env = "AIBENCH_RECORD_SIZE")]
    pub record_size: NonZeroUsize,

    /// Logical items (batch size) carried by one record
    #[arg(long, default_value_t = DEFAULT_ITEMS_PER_RECORD, env = "AIBENCH_ITEMS_PER_RECORD")]
    pub items_per_record: NonZeroU64,

    /// Write the results as JSON to this file
    #[arg(long, env = "AIBENCH_JSON_OUT_FILE")]
    pub json_out_file: Option<PathBuf>,

    /// Write the full latency histogram to this file
    #[arg(long, env = "AIBENCH_OUTPUT_FILE_STATS_HDR_RESPONSE_LATENCY_HIST")]
    pub output_file_stats_hdr_response_latency_hist: Option<PathBuf>,

    /// Write a CPU usage profile of the run to this file
    #[arg(long, env = "AIBENCH_CPUPROFILE")]
    pub cpuprofile: Option<PathBuf>,

    /// Write a memory profile of the run to this file
    #[arg(long, env = "AIBENCH_MEMPROFILE")]
    pub memprofile: Option<PathBuf>,

    /// Free text stored in the results
    #[arg(long, default_value = "", env = "AIBENCH_TEST_DESCRIPTION")]
    pub test_description: String,
}

impl RunArgs {
    pub fn to_configuration(&self, debug: u8) -> RunConfiguration {
        RunConfiguration {
            workers: self.workers.get() as usize,
            limit: self.max_queries,
            limit_rps: self.limit_rps,
            burn_in: self.burn_in,
            reporting_period: self.reporting_period,
            seed: resolve_seed(self.seed),
            debug,
            ignore_errors: self.ignore_errors,
            print_responses: self.print_responses,
            record_size: self.record_size.get(),
            items_per_record: self.items_per_record.get(),
            test_description: self.test_description.clone(),
            input: self.file.clone(),
            json_out_file: self.json_out_file.clone(),
            hdr_latency_file: self.output_file_stats_hdr_response_latency_hist.clone(),
            cpu_profile: self.cpuprofile.clone(),
            mem_profile: self.memprofile.clone(),
            ..Default::default()
        }
    }
}

/// Inference benchmark
#[derive(Args, Debug, Clone)]
pub struct InferenceArgs {
    #[command(flatten)]
    pub run: RunArgs,

    #[command(flatten)]
    pub synthetic: SyntheticArgs,

    /// Run every query twice, reporting the second (warm) run under its own label
    #[arg(long, env = "AIBENCH_PREWARM_QUERIES")]
    pub prewarm_queries: bool,

    /// Let the backend fetch reference data from Redis
    #[arg(long, env = "AIBENCH_ENABLE_REFERENCE_DATA_REDIS")]
    pub enable_reference_data_redis: bool,

    /// Let the backend fetch reference data from MySQL
    #[arg(long, env = "AIBENCH_ENABLE_REFERENCE_DATA_MYSQL")]
    pub enable_reference_data_mysql: bool,

    /// Server side autobatching setting echoed into the results, -1 when unknown
    #[arg(long, default_value_t = DEFAULT_METADATA_AUTOBATCHING, allow_negative_numbers = true, env = "AIBENCH_METADATA_AUTOBATCHING")]
    pub metadata_autobatching: i64,

    /// Record host CPU and memory usage every reporting period
    #[arg(long, env = "AIBENCH_COLLECT_HOST_METRICS")]
    pub collect_host_metrics: bool,
}

impl InferenceArgs {
    pub fn to_configuration(&self, debug: u8) -> RunConfiguration {
        RunConfiguration {
            prewarm_queries: self.prewarm_queries,
            use_reference_data_redis: self.enable_reference_data_redis,
            use_reference_data_mysql: self.enable_reference_data_mysql,
            metadata_autobatching: self.metadata_autobatching,
            ..self.run.to_configuration(debug)
        }
    }
}

/// Load benchmark
#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    #[command(flatten)]
    pub run: RunArgs,

    #[command(flatten)]
    pub synthetic: SyntheticArgs,

    /// Backend commands issued per loaded record
    #[arg(long, default_value_t = DEFAULT_COMMANDS_PER_RECORD, env = "AIBENCH_COMMANDS_PER_RECORD")]
    pub commands_per_record: NonZeroU64,
}
