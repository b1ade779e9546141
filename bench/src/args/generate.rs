use super::defaults::*;
use clap::Args;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Input data generation
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Number of records to write
    #[arg(long, default_value_t = DEFAULT_GENERATED_RECORDS, env = "AIBENCH_GENERATE_COUNT")]
    pub count: u64,

    /// Width of one record in bytes
    #[arg(long, default_value_t = DEFAULT_RECORD_SIZE, env = "AIBENCH_RECORD_SIZE")]
    pub record_size: NonZeroUsize,

    /// PRNG seed, 0 uses the current time
    #[arg(long, default_value_t = DEFAULT_SEED, env = "AIBENCH_SEED")]
    pub seed: u64,

    /// Output file, stdout when not set
    #[arg(long, short = 'o', env = "AIBENCH_GENERATE_OUTPUT")]
    pub output: Option<PathBuf>,
}
