use crate::error::BenchError;
use crate::processor::{
    InferenceQuery, Loader, LoaderFactory, Processor, ProcessorFactory, WorkerContext,
};
use crate::statistics::stat::Stat;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

pub const INFERENCE_LABEL: &str = "Synthetic inference";

/// Behaviour of the in-process stand-in for a serving endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticBackendConfig {
    pub latency: Duration,
    /// Upper bound of the uniformly distributed extra latency
    pub jitter: Duration,
    /// Queries slower than this are flagged as timed out, zero disables it
    pub timeout: Duration,
    /// Partial stages reported per query
    pub stages: u32,
    /// Fail every n-th query, zero never fails
    pub failure_every: u64,
    pub commands_per_record: u64,
    pub items_per_record: u64,
    pub seed: u64,
}

impl Default for SyntheticBackendConfig {
    fn default() -> Self {
        Self {
            latency: Duration::ZERO,
            jitter: Duration::ZERO,
            timeout: Duration::ZERO,
            stages: 0,
            failure_every: 0,
            commands_per_record: 1,
            items_per_record: 1,
            seed: 1,
        }
    }
}

impl SyntheticBackendConfig {
    fn should_fail(&self, query_number: u64) -> bool {
        self.failure_every > 0 && (query_number + 1) % self.failure_every == 0
    }

    fn latency(&self, rng: &mut StdRng) -> Duration {
        let jitter_us = self.jitter.as_micros() as u64;
        if jitter_us == 0 {
            return self.latency;
        }
        self.latency + Duration::from_micros(rng.gen_range(0..=jitter_us))
    }

    fn rng(&self, worker_index: usize) -> StdRng {
        StdRng::seed_from_u64(self.seed.wrapping_add(worker_index as u64))
    }
}

/// Simulates an inference endpoint by sleeping, warm queries take half the time.
pub struct SyntheticProcessor {
    config: Arc<SyntheticBackendConfig>,
    context: Option<WorkerContext>,
    rng: StdRng,
}

impl SyntheticProcessor {
    pub fn new(config: Arc<SyntheticBackendConfig>) -> Self {
        let rng = config.rng(0);
        Self {
            config,
            context: None,
            rng,
        }
    }

    fn context(&self) -> Result<&WorkerContext, BenchError> {
        self.context.as_ref().ok_or_else(|| {
            BenchError::InvalidConfiguration("synthetic processor used before init".to_owned())
        })
    }
}

#[async_trait]
impl Processor for SyntheticProcessor {
    async fn init(&mut self, context: WorkerContext) -> Result<(), BenchError> {
        self.rng = self.config.rng(context.worker_index);
        debug!(
            "Synthetic processor {} of {} ready",
            context.worker_index + 1,
            context.total_workers
        );
        self.context = Some(context);
        Ok(())
    }

    async fn process_inference_query(
        &mut self,
        query: InferenceQuery<'_>,
    ) -> Result<Vec<Stat>, BenchError> {
        if !query.is_warm && self.config.should_fail(query.query_number) {
            return Err(BenchError::QueryFailed {
                worker: query.worker_index,
                query_number: query.query_number,
                reason: "synthetic failure".to_owned(),
            });
        }

        let mut target = self.config.latency(&mut self.rng);
        if query.is_warm {
            target /= 2;
        }
        let context = self.context()?.clone();
        let mut stats = Vec::with_capacity(self.config.stages as usize + 1);
        let started = Instant::now();
        if self.config.stages > 0 {
            let stage_latency = target / self.config.stages;
            for stage in 1..=self.config.stages {
                let stage_started = Instant::now();
                simulate(stage_latency).await;
                let stat = context.stat_pool.get().init(
                    &format!("Stage {stage}"),
                    elapsed_micros(stage_started),
                    self.config.items_per_record,
                    false,
                    "",
                );
                stats.push(stat.partial());
            }
        } else {
            simulate(target).await;
        }
        let latency = started.elapsed();

        let timed_out = !self.config.timeout.is_zero() && latency > self.config.timeout;
        let debug_query = if context.debug > 1 {
            format!("query #{} ({} bytes)", query.query_number, query.record.len())
        } else {
            String::new()
        };
        stats.push(context.stat_pool.get().init(
            INFERENCE_LABEL,
            latency.as_micros() as i64,
            self.config.items_per_record,
            timed_out,
            &debug_query,
        ));

        context.counters.add_response_bytes(query.record.len() as u64);
        if context.print_responses {
            info!(
                "Worker {} response to query #{}: {} bytes echoed",
                query.worker_index,
                query.query_number,
                query.record.len()
            );
        }
        Ok(stats)
    }
}

/// Simulates loading a record with a fixed number of backend commands.
pub struct SyntheticLoader {
    config: Arc<SyntheticBackendConfig>,
    rng: StdRng,
    worker_index: usize,
    loaded: u64,
}

impl SyntheticLoader {
    pub fn new(config: Arc<SyntheticBackendConfig>) -> Self {
        let rng = config.rng(0);
        Self {
            config,
            rng,
            worker_index: 0,
            loaded: 0,
        }
    }
}

#[async_trait]
impl Loader for SyntheticLoader {
    async fn init(&mut self, context: WorkerContext) -> Result<(), BenchError> {
        self.rng = self.config.rng(context.worker_index);
        self.worker_index = context.worker_index;
        Ok(())
    }

    async fn process_load_query(
        &mut self,
        record: &[u8],
        debug: u8,
    ) -> Result<(Vec<Stat>, u64), BenchError> {
        let number = self.loaded;
        self.loaded += 1;
        if self.config.should_fail(number) {
            return Err(BenchError::QueryFailed {
                worker: self.worker_index,
                query_number: number,
                reason: "synthetic load failure".to_owned(),
            });
        }
        simulate(self.config.latency(&mut self.rng)).await;
        if debug > 0 {
            debug!(
                "Loaded record of {} bytes with {} commands",
                record.len(),
                self.config.commands_per_record
            );
        }
        Ok((Vec::new(), self.config.commands_per_record))
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticFactory {
    config: Arc<SyntheticBackendConfig>,
}

impl SyntheticFactory {
    pub fn new(config: SyntheticBackendConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[async_trait]
impl ProcessorFactory for SyntheticFactory {
    async fn create_processor(&self) -> Box<dyn Processor> {
        Box::new(SyntheticProcessor::new(self.config.clone()))
    }
}

#[async_trait]
impl LoaderFactory for SyntheticFactory {
    async fn create_loader(&self) -> Box<dyn Loader> {
        Box::new(SyntheticLoader::new(self.config.clone()))
    }
}

async fn simulate(latency: Duration) {
    if !latency.is_zero() {
        sleep(latency).await;
    }
}

fn elapsed_micros(started: Instant) -> i64 {
    started.elapsed().as_micros() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::stat::new_stat_pool;
    use crate::utils::counters::RunCounters;

    fn context() -> WorkerContext {
        WorkerContext {
            worker_index: 0,
            total_workers: 1,
            counters: Arc::new(RunCounters::new()),
            stat_pool: Arc::new(new_stat_pool(8)),
            debug: 0,
            print_responses: false,
        }
    }

    fn query(record: &[u8], query_number: u64, is_warm: bool) -> InferenceQuery<'_> {
        InferenceQuery {
            record,
            is_warm,
            worker_index: 0,
            use_reference_data_redis: false,
            use_reference_data_mysql: false,
            query_number,
        }
    }

    async fn processor(config: SyntheticBackendConfig) -> SyntheticProcessor {
        let mut processor = SyntheticProcessor::new(Arc::new(config));
        processor.init(context()).await.unwrap();
        processor
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_simulated_latency() {
        let mut processor = processor(SyntheticBackendConfig {
            latency: Duration::from_millis(5),
            items_per_record: 4,
            ..Default::default()
        })
        .await;

        let stats = processor
            .process_inference_query(query(&[0; 16], 0, false))
            .await
            .unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].label(), INFERENCE_LABEL);
        assert_eq!(stats[0].total_results(), 4);
        assert!(stats[0].latency_us() >= 5_000);
        assert!(stats[0].is_effective());
    }

    #[tokio::test(start_paused = true)]
    async fn should_emit_partial_stage_stats() {
        let mut processor = processor(SyntheticBackendConfig {
            latency: Duration::from_millis(6),
            stages: 3,
            ..Default::default()
        })
        .await;

        let stats = processor
            .process_inference_query(query(&[0; 16], 0, false))
            .await
            .unwrap();

        assert_eq!(stats.len(), 4);
        assert!(stats[..3].iter().all(Stat::is_partial));
        assert_eq!(stats[2].label(), "Stage 3");
        assert!(!stats[3].is_partial());
    }

    #[tokio::test(start_paused = true)]
    async fn should_flag_slow_queries_as_timed_out() {
        let mut processor = processor(SyntheticBackendConfig {
            latency: Duration::from_millis(20),
            timeout: Duration::from_millis(10),
            ..Default::default()
        })
        .await;

        let stats = processor
            .process_inference_query(query(&[0; 16], 0, false))
            .await
            .unwrap();
        assert!(stats[0].timed_out());
    }

    #[tokio::test]
    async fn should_fail_every_nth_cold_query() {
        let mut processor = processor(SyntheticBackendConfig {
            failure_every: 3,
            ..Default::default()
        })
        .await;

        let outcomes = run_sequence(&mut processor, 6).await;
        assert_eq!(outcomes, vec![true, true, false, true, true, false]);
        assert!(processor
            .process_inference_query(query(&[0; 16], 2, true))
            .await
            .is_ok());
    }

    async fn run_sequence(processor: &mut SyntheticProcessor, count: u64) -> Vec<bool> {
        let mut outcomes = Vec::new();
        for number in 0..count {
            let outcome = processor
                .process_inference_query(query(&[0; 16], number, false))
                .await;
            outcomes.push(outcome.is_ok());
        }
        outcomes
    }

    #[tokio::test]
    async fn processor_should_require_init() {
        let mut processor = SyntheticProcessor::new(Arc::new(SyntheticBackendConfig::default()));
        let result = processor
            .process_inference_query(query(&[0; 16], 0, false))
            .await;
        assert!(matches!(result, Err(BenchError::InvalidConfiguration(_))));
    }

    #[tokio::test]
    async fn loader_should_report_commands() {
        let mut loader = SyntheticLoader::new(Arc::new(SyntheticBackendConfig {
            commands_per_record: 3,
            ..Default::default()
        }));
        loader.init(context()).await.unwrap();

        let (stats, commands) = loader.process_load_query(&[0; 8], 0).await.unwrap();
        assert!(stats.is_empty());
        assert_eq!(commands, 3);
    }
}
