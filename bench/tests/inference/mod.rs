use crate::common::{config, input, records, CountingFactory, NoopFactory, RECORD_SIZE};
use aibench::benchmark_runner::BenchmarkRunner;
use aibench::error::BenchError;
use aibench::processors::synthetic::{SyntheticBackendConfig, SyntheticFactory, INFERENCE_LABEL};
use aibench::run_config::RunConfiguration;
use std::time::Duration;
use test_case::test_case;

#[tokio::test]
async fn should_process_every_record_with_many_workers() {
    let report = BenchmarkRunner::new(config(4))
        .unwrap()
        .run_with_input(input(records(1000)), &NoopFactory)
        .await
        .unwrap();

    assert_eq!(report.result.totals.records_read, 1000);
    assert_eq!(report.result.totals.items_processed, 1000);
    assert_eq!(report.all_queries_count(), 1000);
    assert_eq!(report.stats.ops_count, 1000);
    assert!(report.result.overall_quantiles.all_queries.is_monotonic());
    assert!(report.result.overall_quantiles.encoded_histogram.is_some());
}

#[tokio::test]
async fn should_abort_on_truncated_input() {
    let mut bytes = records(1000);
    bytes.truncate(999 * RECORD_SIZE + RECORD_SIZE / 2);

    let result = BenchmarkRunner::new(config(4))
        .unwrap()
        .run_with_input(input(bytes), &NoopFactory)
        .await;

    assert!(matches!(
        result,
        Err(BenchError::TruncatedRecord {
            record: 999,
            expected: RECORD_SIZE,
            read: 32,
        })
    ));
}

#[test_case(0, 500; "without burn-in")]
#[test_case(100, 500; "with burn-in")]
#[test_case(500, 500; "burn-in equal to limit")]
#[tokio::test]
async fn should_exclude_burn_in_from_statistics(burn_in: u64, limit: u64) {
    let config = RunConfiguration {
        burn_in,
        limit,
        ..config(3)
    };
    let report = BenchmarkRunner::new(config)
        .unwrap()
        .run_with_input(input(records(1000)), &NoopFactory)
        .await
        .unwrap();

    assert_eq!(report.result.totals.records_read, limit);
    assert_eq!(report.result.totals.items_processed, limit);
    assert_eq!(report.all_queries_count(), limit - burn_in);
}

#[tokio::test]
async fn should_reject_burn_in_larger_than_limit() {
    let config = RunConfiguration {
        burn_in: 11,
        limit: 10,
        ..config(1)
    };
    assert!(matches!(
        BenchmarkRunner::new(config),
        Err(BenchError::InvalidConfiguration(_))
    ));
}

#[tokio::test]
async fn should_fail_run_on_query_error_by_default() {
    let factory = SyntheticFactory::new(SyntheticBackendConfig {
        failure_every: 10,
        ..Default::default()
    });
    let result = BenchmarkRunner::new(config(2))
        .unwrap()
        .run_with_input(input(records(100)), &factory)
        .await;

    assert!(matches!(result, Err(BenchError::QueryFailed { .. })));
}

#[tokio::test]
async fn should_skip_failed_queries_when_ignoring_errors() {
    let factory = SyntheticFactory::new(SyntheticBackendConfig {
        failure_every: 10,
        ..Default::default()
    });
    let config = RunConfiguration {
        ignore_errors: true,
        ..config(2)
    };
    let report = BenchmarkRunner::new(config)
        .unwrap()
        .run_with_input(input(records(100)), &factory)
        .await
        .unwrap();

    assert_eq!(report.result.totals.records_read, 100);
    assert_eq!(report.result.totals.items_processed, 90);
    assert_eq!(report.all_queries_count(), 90);
}

#[tokio::test]
async fn should_count_batched_items() {
    let factory = SyntheticFactory::new(SyntheticBackendConfig {
        items_per_record: 8,
        ..Default::default()
    });
    let config = RunConfiguration {
        items_per_record: 8,
        ..config(2)
    };
    let report = BenchmarkRunner::new(config)
        .unwrap()
        .run_with_input(input(records(50)), &factory)
        .await
        .unwrap();

    assert_eq!(report.result.totals.items_processed, 400);
    assert_eq!(report.result.tensor_batch_size, 8);
    assert_eq!(report.all_queries_count(), 50);
}

#[tokio::test]
async fn should_report_warm_queries_under_separate_label() {
    let factory = SyntheticFactory::new(SyntheticBackendConfig::default());
    let config = RunConfiguration {
        prewarm_queries: true,
        ..config(2)
    };
    let report = BenchmarkRunner::new(config)
        .unwrap()
        .run_with_input(input(records(20)), &factory)
        .await
        .unwrap();

    let warm_label = format!("{INFERENCE_LABEL} (warm)");
    assert_eq!(report.stats.stats_mapping[INFERENCE_LABEL].count(), 20);
    assert_eq!(report.stats.stats_mapping[&warm_label].count(), 20);
    assert_eq!(report.result.totals.items_processed, 20);
}

#[tokio::test]
async fn should_keep_cold_results_when_warm_query_fails() {
    let factory = CountingFactory {
        fail_warm: true,
        ..Default::default()
    };
    let config = RunConfiguration {
        prewarm_queries: true,
        ignore_errors: true,
        ..config(2)
    };
    let report = BenchmarkRunner::new(config)
        .unwrap()
        .run_with_input(input(records(50)), &factory)
        .await
        .unwrap();

    assert_eq!(factory.calls(), 100);
    assert_eq!(report.result.totals.items_processed, 50);
    assert_eq!(report.stats.stats_mapping["Query"].count(), 50);
    assert!(!report.stats.stats_mapping.contains_key("Query (warm)"));
    assert_eq!(report.all_queries_count(), 50);
}

#[tokio::test]
async fn should_fail_run_on_warm_query_error_by_default() {
    let factory = CountingFactory {
        fail_warm: true,
        ..Default::default()
    };
    let config = RunConfiguration {
        prewarm_queries: true,
        ..config(2)
    };
    let result = BenchmarkRunner::new(config)
        .unwrap()
        .run_with_input(input(records(50)), &factory)
        .await;

    assert!(matches!(result, Err(BenchError::QueryFailed { .. })));
}

#[tokio::test]
async fn should_keep_partial_stages_out_of_all_queries() {
    let factory = SyntheticFactory::new(SyntheticBackendConfig {
        stages: 2,
        ..Default::default()
    });
    let report = BenchmarkRunner::new(config(2))
        .unwrap()
        .run_with_input(input(records(30)), &factory)
        .await
        .unwrap();

    assert_eq!(report.stats.stats_mapping["Stage 1"].count(), 30);
    assert_eq!(report.stats.stats_mapping["Stage 2"].count(), 30);
    assert_eq!(report.all_queries_count(), 30);
    assert_eq!(report.result.totals.items_processed, 30);
}

#[tokio::test(start_paused = true)]
async fn should_respect_rate_limit() {
    let config = RunConfiguration {
        limit_rps: 200,
        ..config(4)
    };
    let report = BenchmarkRunner::new(config)
        .unwrap()
        .run_with_input(input(records(100)), &NoopFactory)
        .await
        .unwrap();

    let duration = Duration::from_millis(report.result.duration_millis);
    assert_eq!(report.result.totals.items_processed, 100);
    assert!(duration >= Duration::from_millis(490), "{duration:?}");
    assert!(duration <= Duration::from_millis(520), "{duration:?}");
}

#[tokio::test(start_paused = true)]
async fn should_rate_limit_warm_queries_too() {
    let factory = CountingFactory::default();
    let config = RunConfiguration {
        limit_rps: 200,
        prewarm_queries: true,
        ..config(4)
    };
    let report = BenchmarkRunner::new(config)
        .unwrap()
        .run_with_input(input(records(100)), &factory)
        .await
        .unwrap();

    let duration = Duration::from_millis(report.result.duration_millis);
    let calls_per_second = factory.calls() as f64 / duration.as_secs_f64();
    assert_eq!(factory.calls(), 200);
    assert_eq!(report.result.totals.items_processed, 100);
    assert!(duration >= Duration::from_millis(990), "{duration:?}");
    assert!(calls_per_second <= 205.0, "{calls_per_second}");
}

#[tokio::test]
async fn should_write_json_and_histogram_files() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("results").join("run.json");
    let hdr_path = dir.path().join("latency.hdr");
    let config = RunConfiguration {
        json_out_file: Some(json_path.clone()),
        hdr_latency_file: Some(hdr_path.clone()),
        test_description: "noop run".to_owned(),
        ..config(2)
    };

    BenchmarkRunner::new(config)
        .unwrap()
        .with_db_specific_config("backend", serde_json::json!("noop"))
        .run_with_input(input(records(100)), &NoopFactory)
        .await
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&json_path).unwrap()).unwrap();
    assert_eq!(json["Kind"], "inference");
    assert_eq!(json["Workers"], 2);
    assert_eq!(json["TestDescription"], "noop run");
    assert_eq!(json["DBSpecificConfigs"]["backend"], "noop");
    assert_eq!(json["Totals"]["ItemsProcessed"], 100);
    assert!(json["OverallRates"]["overallOpsRate"].as_f64().unwrap() > 0.0);
    assert!(json["OverallQuantiles"]["AllQueries"]["q50"].as_f64().unwrap() > 0.0);
    assert!(json["OverallQuantiles"]["EncodedHistogram"].is_string());

    let histogram = std::fs::read_to_string(&hdr_path).unwrap();
    assert!(histogram.trim_start().starts_with("Value"));
    assert!(histogram
        .lines()
        .any(|line| line.contains("Total count") && line.ends_with(" 100]")));
}

#[tokio::test]
async fn should_fail_when_input_file_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfiguration {
        input: Some(dir.path().join("missing.bin")),
        ..config(1)
    };
    let result = BenchmarkRunner::new(config).unwrap().run(&NoopFactory).await;
    assert!(matches!(result, Err(BenchError::CannotOpenInput { .. })));
}
