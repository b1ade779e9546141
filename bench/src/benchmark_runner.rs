use crate::error::BenchError;
use crate::output::{build_test_result, start_profiler, write_outputs, RunReport};
use crate::pipeline::{Pipeline, ProcessedRecord, RecordWorker};
use crate::processor::{
    InferenceQuery, MetricCollector, Processor, ProcessorFactory, WorkerContext,
};
use crate::producer::{open_input, Record};
use crate::rate_limiter::Throttle;
use crate::reporter::ReportStyle;
use crate::run_config::RunConfiguration;
use crate::statistics::stat::new_stat_pool;
use crate::utils::counters::RunCounters;
use aibench_report::run_kind::RunKind;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tracing::{info, warn};

/// Runs inference queries from the input through one processor per worker.
pub struct BenchmarkRunner {
    config: Arc<RunConfiguration>,
    collector: Option<Box<dyn MetricCollector>>,
    db_specific_configs: BTreeMap<String, serde_json::Value>,
}

impl BenchmarkRunner {
    pub fn new(config: RunConfiguration) -> Result<Self, BenchError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            collector: None,
            db_specific_configs: BTreeMap::new(),
        })
    }

    pub fn with_metric_collector(mut self, collector: Box<dyn MetricCollector>) -> Self {
        self.collector = Some(collector);
        self
    }

    /// Adds a backend specific entry to the `DBSpecificConfigs` section of the results.
    pub fn with_db_specific_config(
        mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.db_specific_configs.insert(key.into(), value);
        self
    }

    pub async fn run(self, factory: &dyn ProcessorFactory) -> Result<RunReport, BenchError> {
        let input = open_input(self.config.input.as_deref()).await?;
        self.run_with_input(input, factory).await
    }

    pub async fn run_with_input<R>(
        self,
        input: R,
        factory: &dyn ProcessorFactory,
    ) -> Result<RunReport, BenchError>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let config = self.config;
        info!(
            "Starting the inference benchmark with {} workers, limit: {}, burn-in: {}, rate limit: {} req/s",
            config.workers, config.limit, config.burn_in, config.limit_rps
        );
        let mut profiler = start_profiler(&config);
        let counters = Arc::new(RunCounters::new());
        let stat_pool = Arc::new(new_stat_pool(config.workers * 16));

        let mut workers = Vec::with_capacity(config.workers);
        for worker_index in 0..config.workers {
            workers.push(InferenceWorker {
                processor: factory.create_processor().await,
                context: WorkerContext {
                    worker_index,
                    total_workers: config.workers,
                    counters: counters.clone(),
                    stat_pool: stat_pool.clone(),
                    debug: config.debug,
                    print_responses: config.print_responses,
                },
                prewarm_queries: config.prewarm_queries,
                use_reference_data_redis: config.use_reference_data_redis,
                use_reference_data_mysql: config.use_reference_data_mysql,
            });
        }

        let outcome = Pipeline::new(
            config.clone(),
            counters.clone(),
            stat_pool,
            ReportStyle::Inference,
        )
        .with_metric_collector(self.collector)
        .run(input, workers)
        .await?;

        {
            let mut stdout = std::io::stdout().lock();
            if let Err(error) = outcome
                .stats
                .write_report(&mut stdout, outcome.elapsed)
                .and_then(|_| stdout.flush())
            {
                warn!("Cannot write the latency report: {error}");
            }
        }

        let result = build_test_result(
            RunKind::Inference,
            &config,
            &outcome,
            &counters,
            self.db_specific_configs,
        );
        write_outputs(&config, &result, &outcome.stats, profiler.as_mut())?;

        Ok(RunReport {
            result,
            stats: outcome.stats,
        })
    }
}

/// Drives one processor, replaying each record once more as a warm query when enabled.
struct InferenceWorker {
    processor: Box<dyn Processor>,
    context: WorkerContext,
    prewarm_queries: bool,
    use_reference_data_redis: bool,
    use_reference_data_mysql: bool,
}

impl InferenceWorker {
    fn query<'a>(&self, record: &'a Record, is_warm: bool) -> InferenceQuery<'a> {
        InferenceQuery {
            record: &record.payload,
            is_warm,
            worker_index: self.context.worker_index,
            use_reference_data_redis: self.use_reference_data_redis,
            use_reference_data_mysql: self.use_reference_data_mysql,
            query_number: record.sequence,
        }
    }
}

#[async_trait]
impl RecordWorker for InferenceWorker {
    async fn start(&mut self) -> Result<(), BenchError> {
        self.processor.init(self.context.clone()).await
    }

    async fn process(
        &mut self,
        record: &Record,
        throttle: &Throttle,
    ) -> Result<ProcessedRecord, BenchError> {
        throttle.acquire().await;
        let cold = self.query(record, false);
        let mut stats = self.processor.process_inference_query(cold).await?;
        let items = stats
            .iter()
            .filter(|stat| stat.is_effective())
            .map(|stat| stat.total_results())
            .sum::<u64>();

        let mut failure = None;
        if self.prewarm_queries {
            throttle.acquire().await;
            let warm = self.query(record, true);
            match self.processor.process_inference_query(warm).await {
                Ok(warm_stats) => stats.extend(warm_stats.into_iter().map(|mut stat| {
                    stat.mark_warm();
                    stat
                })),
                Err(error) => failure = Some(error),
            }
        }

        Ok(ProcessedRecord {
            stats,
            items,
            failure,
        })
    }

    async fn close(&mut self) -> Result<(), BenchError> {
        self.processor.close().await
    }
}
