use crate::common::{config, input, records};
use aibench::error::BenchError;
use aibench::load_runner::LoadRunner;
use aibench::processors::synthetic::{SyntheticBackendConfig, SyntheticFactory};
use aibench::run_config::RunConfiguration;
use aibench_report::run_kind::RunKind;

#[tokio::test]
async fn should_count_loaded_items_and_commands() {
    let factory = SyntheticFactory::new(SyntheticBackendConfig {
        commands_per_record: 3,
        items_per_record: 2,
        ..Default::default()
    });
    let config = RunConfiguration {
        items_per_record: 2,
        ..config(4)
    };
    let report = LoadRunner::new(config)
        .unwrap()
        .run_with_input(input(records(50)), &factory)
        .await
        .unwrap();

    assert_eq!(report.result.kind, RunKind::Load);
    assert_eq!(report.result.totals.records_read, 50);
    assert_eq!(report.result.totals.items_processed, 100);
    assert_eq!(report.result.totals.commands_issued, 150);
}

#[tokio::test]
async fn should_stop_loading_at_limit() {
    let factory = SyntheticFactory::new(SyntheticBackendConfig::default());
    let config = RunConfiguration {
        limit: 7,
        ..config(2)
    };
    let report = LoadRunner::new(config)
        .unwrap()
        .run_with_input(input(records(50)), &factory)
        .await
        .unwrap();

    assert_eq!(report.result.totals.records_read, 7);
    assert_eq!(report.result.totals.commands_issued, 7);
}

#[tokio::test]
async fn should_abort_load_on_failure() {
    let factory = SyntheticFactory::new(SyntheticBackendConfig {
        failure_every: 5,
        ..Default::default()
    });
    let result = LoadRunner::new(config(1))
        .unwrap()
        .run_with_input(input(records(20)), &factory)
        .await;

    assert!(matches!(result, Err(BenchError::QueryFailed { .. })));
}

#[tokio::test]
async fn should_reject_zero_workers() {
    assert!(matches!(
        LoadRunner::new(config(0)),
        Err(BenchError::InvalidConfiguration(_))
    ));
}
