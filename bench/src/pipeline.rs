use crate::error::BenchError;
use crate::processor::MetricCollector;
use crate::producer::{new_record_pool, Producer, Record, RecordPool};
use crate::rate_limiter::{RateLimiter, Throttle};
use crate::reporter::{poll_metric_collector, ReportStyle, Reporter};
use crate::run_config::RunConfiguration;
use crate::statistics::aggregator::{AggregatedStats, StatAggregator};
use crate::statistics::stat::{Stat, StatPool};
use crate::utils::counters::RunCounters;
use aibench_report::run_time_stats::ClientRunTimeStats;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Result of handing one record to a backend unit.
#[derive(Debug, Default)]
pub struct ProcessedRecord {
    pub stats: Vec<Stat>,
    /// Logical items accounted to the processed counter
    pub items: u64,
    /// Error of a follow-up dispatch raised after `stats` were already collected
    pub failure: Option<BenchError>,
}

/// Per-worker adapter between the pipeline and a backend unit.
///
/// Implementations acquire `throttle` before every backend dispatch they issue for a record.
#[async_trait]
pub trait RecordWorker: Send + 'static {
    async fn start(&mut self) -> Result<(), BenchError>;
    async fn process(
        &mut self,
        record: &Record,
        throttle: &Throttle,
    ) -> Result<ProcessedRecord, BenchError>;
    async fn close(&mut self) -> Result<(), BenchError>;
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub records_read: u64,
    pub stats: AggregatedStats,
    pub client_run_time_stats: BTreeMap<i64, ClientRunTimeStats>,
    pub server_run_time_stats: BTreeMap<i64, serde_json::Value>,
    pub wall_start: DateTime<Utc>,
    pub wall_end: DateTime<Utc>,
    pub elapsed: Duration,
}

enum PipelineTask {
    Producer(u64),
    Worker(usize),
    Aggregator(AggregatedStats),
    Reporter(BTreeMap<i64, ClientRunTimeStats>),
    Collector(BTreeMap<i64, serde_json::Value>),
}

/// Producer, worker pool, stat aggregator and the periodic tasks of one run.
pub struct Pipeline {
    config: Arc<RunConfiguration>,
    counters: Arc<RunCounters>,
    stat_pool: Arc<StatPool>,
    record_pool: Arc<RecordPool>,
    report_style: ReportStyle,
    collector: Option<Box<dyn MetricCollector>>,
}

impl Pipeline {
    pub fn new(
        config: Arc<RunConfiguration>,
        counters: Arc<RunCounters>,
        stat_pool: Arc<StatPool>,
        report_style: ReportStyle,
    ) -> Self {
        let record_pool = Arc::new(new_record_pool(config.workers * 2, config.record_size));
        Self {
            config,
            counters,
            stat_pool,
            record_pool,
            report_style,
            collector: None,
        }
    }

    pub fn with_metric_collector(mut self, collector: Option<Box<dyn MetricCollector>>) -> Self {
        self.collector = collector;
        self
    }

    pub async fn run<R, W>(self, input: R, workers: Vec<W>) -> Result<PipelineOutcome, BenchError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: RecordWorker,
    {
        let config = self.config.clone();
        let workers_count = workers.len();
        if workers_count != config.workers {
            return Err(BenchError::InvalidConfiguration(format!(
                "expected {} workers, got {workers_count}",
                config.workers
            )));
        }

        let mut tasks = JoinSet::new();
        let (record_tx, record_rx) = flume::bounded::<Record>(workers_count);
        let (stats_tx, stats_rx) = mpsc::channel::<Stat>(workers_count);
        let (snapshot_tx, snapshot_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let aggregator =
            StatAggregator::new(config.burn_in, workers_count, self.stat_pool.clone())?;
        tasks.spawn(async move {
            Ok::<_, BenchError>(PipelineTask::Aggregator(
                aggregator.run(stats_rx, snapshot_rx).await,
            ))
        });

        let limiter = RateLimiter::new(config.limit_rps).map(Arc::new);
        for (index, worker) in workers.into_iter().enumerate() {
            let worker_loop = WorkerLoop {
                index,
                records: record_rx.clone(),
                stats: stats_tx.clone(),
                throttle: Throttle::new(limiter.clone(), config.items_per_record),
                counters: self.counters.clone(),
                record_pool: self.record_pool.clone(),
                ignore_errors: config.ignore_errors,
            };
            tasks.spawn(async move { worker_loop.run(worker).await.map(PipelineTask::Worker) });
        }
        drop(record_rx);
        drop(stats_tx);

        let wall_start = Utc::now();
        let started = Instant::now();

        if config.reporting_enabled() {
            let reporter = Reporter::new(
                self.report_style,
                config.reporting_period,
                self.counters.clone(),
                snapshot_tx,
                shutdown_rx.clone(),
            );
            tasks.spawn(async move { Ok(PipelineTask::Reporter(reporter.run().await)) });
        } else {
            drop(snapshot_tx);
        }

        match self.collector {
            Some(collector) if config.reporting_enabled() => {
                let period = config.reporting_period;
                let ignore_errors = config.ignore_errors;
                let shutdown = shutdown_rx.clone();
                tasks.spawn(async move {
                    poll_metric_collector(collector, period, ignore_errors, shutdown)
                        .await
                        .map(PipelineTask::Collector)
                });
            }
            Some(_) => warn!("Metric collection needs a reporting period, skipping it"),
            None => {}
        }

        let producer = Producer::new(
            input,
            config.record_size,
            config.limit,
            self.record_pool.clone(),
        );
        tasks.spawn(async move { producer.produce(record_tx).await.map(PipelineTask::Producer) });

        let mut records_read = 0;
        let mut remaining_workers = workers_count;
        let mut aggregated = None;
        let mut wall_end = wall_start;
        let mut elapsed = Duration::ZERO;
        let mut client_run_time_stats = BTreeMap::new();
        let mut server_run_time_stats = BTreeMap::new();

        while let Some(joined) = tasks.join_next().await {
            match joined?? {
                PipelineTask::Producer(count) => {
                    records_read = count;
                    info!("Read a total of {count} records");
                }
                PipelineTask::Worker(index) => {
                    remaining_workers -= 1;
                    debug!("Worker {index} finished, {remaining_workers} still running");
                    if remaining_workers == 0 {
                        let _ = shutdown_tx.send(true);
                    }
                }
                PipelineTask::Aggregator(stats) => {
                    wall_end = Utc::now();
                    elapsed = started.elapsed();
                    aggregated = Some(stats);
                }
                PipelineTask::Reporter(series) => client_run_time_stats = series,
                PipelineTask::Collector(series) => server_run_time_stats = series,
            }
        }

        let stats = aggregated.ok_or(BenchError::StatChannelClosed)?;
        Ok(PipelineOutcome {
            records_read,
            stats,
            client_run_time_stats,
            server_run_time_stats,
            wall_start,
            wall_end,
            elapsed,
        })
    }
}

struct WorkerLoop {
    index: usize,
    records: flume::Receiver<Record>,
    stats: mpsc::Sender<Stat>,
    throttle: Throttle,
    counters: Arc<RunCounters>,
    record_pool: Arc<RecordPool>,
    ignore_errors: bool,
}

impl WorkerLoop {
    async fn run<W: RecordWorker>(self, mut worker: W) -> Result<usize, BenchError> {
        worker.start().await?;
        while let Ok(record) = self.records.recv_async().await {
            let outcome = worker.process(&record, &self.throttle).await;
            self.record_pool.put(record.payload);
            match outcome {
                Ok(processed) => {
                    self.counters.add_processed(processed.items);
                    for stat in processed.stats {
                        self.stats
                            .send(stat)
                            .await
                            .map_err(|_| BenchError::StatChannelClosed)?;
                    }
                    if let Some(error) = processed.failure {
                        self.on_error(error)?;
                    }
                }
                Err(error) => self.on_error(error)?,
            }
        }
        worker.close().await?;
        Ok(self.index)
    }

    fn on_error(&self, error: BenchError) -> Result<(), BenchError> {
        if !self.ignore_errors {
            return Err(error);
        }
        warn!("Ignoring inference error on worker {}: {error}", self.index);
        Ok(())
    }
}
