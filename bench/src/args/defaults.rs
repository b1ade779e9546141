use std::num::{NonZeroU32, NonZeroU64, NonZeroUsize};

pub const DEFAULT_WORKERS: NonZeroU32 = nonzero_lit::u32!(1);
pub const DEFAULT_MAX_QUERIES: u64 = 0;
pub const DEFAULT_LIMIT_RPS: u64 = 0;
pub const DEFAULT_BURN_IN: u64 = 0;
pub const DEFAULT_REPORTING_PERIOD: &str = "1s";
pub const DEFAULT_SEED: u64 = 0;
pub const DEFAULT_DEBUG: u8 = 0;

pub const DEFAULT_RECORD_SIZE: NonZeroUsize = nonzero_lit::usize!(1152);
pub const DEFAULT_ITEMS_PER_RECORD: NonZeroU64 = nonzero_lit::u64!(1);
pub const DEFAULT_METADATA_AUTOBATCHING: i64 = -1;

pub const DEFAULT_SYNTHETIC_LATENCY: &str = "1ms";
pub const DEFAULT_SYNTHETIC_JITTER: &str = "0";
pub const DEFAULT_SYNTHETIC_TIMEOUT: &str = "0";
pub const DEFAULT_SYNTHETIC_STAGES: u32 = 0;
pub const DEFAULT_SYNTHETIC_FAILURE_EVERY: u64 = 0;
pub const DEFAULT_COMMANDS_PER_RECORD: NonZeroU64 = nonzero_lit::u64!(1);

pub const DEFAULT_GENERATED_RECORDS: u64 = 1000;
