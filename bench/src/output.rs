use crate::error::BenchError;
use crate::pipeline::PipelineOutcome;
use crate::reporter::print_line;
use crate::run_config::RunConfiguration;
use crate::statistics::aggregator::AggregatedStats;
use crate::utils::counters::RunCounters;
use crate::utils::profile::ProcessProfiler;
use crate::utils::write_output_file;
use aibench_report::hardware::BenchmarkHardware;
use aibench_report::run_kind::RunKind;
use aibench_report::test_result::{
    OverallQuantiles, OverallRates, RunTotals, TestResult, RESULT_FORMAT_VERSION,
};
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    pub result: TestResult,
    pub stats: AggregatedStats,
}

impl RunReport {
    pub fn all_queries_count(&self) -> u64 {
        self.stats
            .all_queries()
            .map(|group| group.count())
            .unwrap_or_default()
    }
}

pub(crate) fn build_test_result(
    kind: RunKind,
    config: &RunConfiguration,
    outcome: &PipelineOutcome,
    counters: &RunCounters,
    db_specific_configs: BTreeMap<String, serde_json::Value>,
) -> TestResult {
    let items_processed = counters.processed();
    let elapsed_secs = outcome.elapsed.as_secs_f64();
    let overall_ops_rate = if elapsed_secs > 0.0 {
        items_processed as f64 / elapsed_secs
    } else {
        0.0
    };

    let all_queries = outcome.stats.all_queries();
    let overall_quantiles = match all_queries {
        Some(group) => OverallQuantiles {
            all_queries: group.quantiles(),
            encoded_histogram: group
                .encode()
                .map_err(|error| debug!("Skipping overall histogram encoding: {error}"))
                .ok(),
        },
        None => OverallQuantiles::default(),
    };

    let identifier = hostname::get()
        .ok()
        .map(|name| name.to_string_lossy().into_owned());

    TestResult {
        result_format_version: RESULT_FORMAT_VERSION.to_owned(),
        uuid: Uuid::new_v4(),
        kind,
        limit: config.limit,
        burn_in: config.burn_in,
        metadata_autobatching: config.metadata_autobatching,
        tensor_batch_size: config.items_per_record,
        workers: config.workers as u32,
        max_rps: config.limit_rps,
        test_description: config.test_description.clone(),
        db_specific_configs,
        start_time: outcome.wall_start.timestamp(),
        end_time: outcome.wall_end.timestamp(),
        duration_millis: outcome.elapsed.as_millis() as u64,
        totals: RunTotals {
            records_read: outcome.records_read,
            items_processed,
            commands_issued: counters.commands(),
            response_bytes: counters.response_bytes(),
            timed_out: all_queries.map(|group| group.timed_out_count()).unwrap_or_default(),
        },
        overall_rates: OverallRates { overall_ops_rate },
        overall_quantiles,
        client_run_time_stats: outcome.client_run_time_stats.clone(),
        server_run_time_stats: outcome.server_run_time_stats.clone(),
        hardware: BenchmarkHardware::get_system_info_with_identifier(identifier),
    }
}

/// Writes the configured result files. Any failure here fails the run.
pub(crate) fn write_outputs(
    config: &RunConfiguration,
    result: &TestResult,
    stats: &AggregatedStats,
    profiler: Option<&mut ProcessProfiler>,
) -> Result<(), BenchError> {
    if let Some(path) = &config.json_out_file {
        info!("Saving JSON results to {}", path.display());
        result
            .dump_to_json(path)
            .map_err(|source| BenchError::CannotWriteToFile {
                path: path.clone(),
                source,
            })?;
    }

    print_line(&format!(
        "Took: {:8.3} sec",
        result.duration_millis as f64 / 1000.0
    ));

    if let Some(path) = &config.hdr_latency_file {
        info!("Saving Query Latencies HDR Histogram to {}", path.display());
        let dump = stats
            .all_queries()
            .map(|group| group.full_histogram())
            .unwrap_or_default();
        write_output_file(path, dump)?;
    }

    if let Some(profiler) = profiler {
        if let Some(path) = &config.cpu_profile {
            profiler.write_cpu_profile(path)?;
        }
        if let Some(path) = &config.mem_profile {
            profiler.write_memory_profile(path)?;
        }
    }
    Ok(())
}

pub(crate) fn start_profiler(config: &RunConfiguration) -> Option<ProcessProfiler> {
    if config.cpu_profile.is_none() && config.mem_profile.is_none() {
        return None;
    }
    ProcessProfiler::start()
}
