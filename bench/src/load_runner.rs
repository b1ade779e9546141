use crate::error::BenchError;
use crate::output::{build_test_result, start_profiler, write_outputs, RunReport};
use crate::pipeline::{Pipeline, ProcessedRecord, RecordWorker};
use crate::processor::{Loader, LoaderFactory, WorkerContext};
use crate::producer::{open_input, Record};
use crate::rate_limiter::Throttle;
use crate::reporter::{print_line, ReportStyle};
use crate::run_config::RunConfiguration;
use crate::statistics::stat::new_stat_pool;
use crate::utils::counters::RunCounters;
use aibench_report::run_kind::RunKind;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tracing::info;

/// Populates a backend from the input, one loader per worker.
pub struct LoadRunner {
    config: Arc<RunConfiguration>,
}

impl LoadRunner {
    pub fn new(config: RunConfiguration) -> Result<Self, BenchError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub async fn run(self, factory: &dyn LoaderFactory) -> Result<RunReport, BenchError> {
        let input = open_input(self.config.input.as_deref()).await?;
        self.run_with_input(input, factory).await
    }

    pub async fn run_with_input<R>(
        self,
        input: R,
        factory: &dyn LoaderFactory,
    ) -> Result<RunReport, BenchError>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let config = self.config;
        info!(
            "Starting the load with {} workers, limit: {}",
            config.workers, config.limit
        );
        let mut profiler = start_profiler(&config);
        let counters = Arc::new(RunCounters::new());
        let stat_pool = Arc::new(new_stat_pool(config.workers * 4));

        let mut workers = Vec::with_capacity(config.workers);
        for worker_index in 0..config.workers {
            workers.push(LoadWorker {
                loader: factory.create_loader().await,
                context: WorkerContext {
                    worker_index,
                    total_workers: config.workers,
                    counters: counters.clone(),
                    stat_pool: stat_pool.clone(),
                    debug: config.debug,
                    print_responses: config.print_responses,
                },
                items_per_record: config.items_per_record,
            });
        }

        let outcome = Pipeline::new(config.clone(), counters.clone(), stat_pool, ReportStyle::Load)
            .run(input, workers)
            .await?;

        let loaded = counters.processed();
        let took = outcome.elapsed.as_secs_f64();
        let mean_rate = if took > 0.0 { loaded as f64 / took } else { 0.0 };
        print_line("\nSummary:");
        print_line(&format!(
            "Loaded {loaded} inserts in {took:.3}sec with {} workers (mean rate {mean_rate:.2} inserts/sec), {} commands issued",
            config.workers,
            counters.commands()
        ));

        let result = build_test_result(
            RunKind::Load,
            &config,
            &outcome,
            &counters,
            BTreeMap::new(),
        );
        write_outputs(&config, &result, &outcome.stats, profiler.as_mut())?;

        Ok(RunReport {
            result,
            stats: outcome.stats,
        })
    }
}

struct LoadWorker {
    loader: Box<dyn Loader>,
    context: WorkerContext,
    items_per_record: u64,
}

#[async_trait]
impl RecordWorker for LoadWorker {
    async fn start(&mut self) -> Result<(), BenchError> {
        self.loader.init(self.context.clone()).await
    }

    async fn process(
        &mut self,
        record: &Record,
        throttle: &Throttle,
    ) -> Result<ProcessedRecord, BenchError> {
        throttle.acquire().await;
        let (stats, commands) = self
            .loader
            .process_load_query(&record.payload, self.context.debug)
            .await?;
        self.context.counters.add_commands(commands);
        Ok(ProcessedRecord {
            stats,
            items: self.items_per_record,
            failure: None,
        })
    }

    async fn close(&mut self) -> Result<(), BenchError> {
        self.loader.close().await
    }
}
