use super::hardware::BenchmarkHardware;
use super::quantiles::LatencyQuantiles;
use super::run_kind::RunKind;
use super::run_time_stats::ClientRunTimeStats;
use crate::utils::round_float;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

pub const RESULT_FORMAT_VERSION: &str = "0.1";

/// Final outcome of a benchmark run, serialized as the JSON results file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct TestResult {
    pub result_format_version: String,

    /// Unique identifier of the run
    pub uuid: Uuid,

    pub kind: RunKind,

    /// Maximum number of records read from the input, 0 means all of them
    pub limit: u64,

    /// Number of measurements excluded from the statistics
    pub burn_in: u64,

    /// Server side autobatching info, -1 when unknown
    pub metadata_autobatching: i64,

    /// Logical items carried by one record
    pub tensor_batch_size: u64,

    pub workers: u32,

    /// Requests per second cap, 0 means unlimited
    pub max_rps: u64,

    pub test_description: String,

    #[serde(rename = "DBSpecificConfigs")]
    pub db_specific_configs: BTreeMap<String, serde_json::Value>,

    /// Wall clock start, unix seconds
    pub start_time: i64,

    /// Wall clock end, unix seconds
    pub end_time: i64,

    pub duration_millis: u64,

    pub totals: RunTotals,

    pub overall_rates: OverallRates,

    pub overall_quantiles: OverallQuantiles,

    /// Periodic client snapshots keyed by unix nanoseconds
    pub client_run_time_stats: BTreeMap<i64, ClientRunTimeStats>,

    /// Periodic server metrics keyed by unix nanoseconds
    pub server_run_time_stats: BTreeMap<i64, serde_json::Value>,

    pub hardware: BenchmarkHardware,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct RunTotals {
    pub records_read: u64,
    pub items_processed: u64,
    pub commands_issued: u64,
    pub response_bytes: u64,
    pub timed_out: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct OverallRates {
    #[serde(rename = "overallOpsRate", serialize_with = "round_float")]
    pub overall_ops_rate: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct OverallQuantiles {
    #[serde(rename = "AllQueries")]
    pub all_queries: LatencyQuantiles,

    /// Base64 of the DEFLATE-compressed V2 histogram, absent when encoding failed
    #[serde(rename = "EncodedHistogram")]
    pub encoded_histogram: Option<String>,
}

impl TestResult {
    pub fn dump_to_json(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
