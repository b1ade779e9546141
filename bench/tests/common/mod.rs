use aibench::error::BenchError;
use aibench::processor::{InferenceQuery, Processor, ProcessorFactory, WorkerContext};
use aibench::run_config::RunConfiguration;
use aibench::statistics::stat::Stat;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const RECORD_SIZE: usize = 64;

/// `count` records of `RECORD_SIZE` bytes, each filled with its index.
pub fn records(count: usize) -> Vec<u8> {
    (0..count)
        .flat_map(|index| std::iter::repeat((index % 256) as u8).take(RECORD_SIZE))
        .collect()
}

pub fn input(bytes: Vec<u8>) -> &'static [u8] {
    Box::leak(bytes.into_boxed_slice())
}

pub fn config(workers: usize) -> RunConfiguration {
    RunConfiguration {
        workers,
        record_size: RECORD_SIZE,
        reporting_period: Duration::ZERO,
        seed: 1,
        ..Default::default()
    }
}

/// Answers every query immediately with a single measurement of one item.
pub struct NoopFactory;

struct NoopProcessor {
    context: Option<WorkerContext>,
}

#[async_trait]
impl ProcessorFactory for NoopFactory {
    async fn create_processor(&self) -> Box<dyn Processor> {
        Box::new(NoopProcessor { context: None })
    }
}

#[async_trait]
impl Processor for NoopProcessor {
    async fn init(&mut self, context: WorkerContext) -> Result<(), BenchError> {
        self.context = Some(context);
        Ok(())
    }

    async fn process_inference_query(
        &mut self,
        query: InferenceQuery<'_>,
    ) -> Result<Vec<Stat>, BenchError> {
        let context = self.context.as_ref().expect("processor initialized");
        let latency_us = 100 + query.record[0] as i64;
        Ok(vec![context
            .stat_pool
            .get()
            .init("Query", latency_us, 1, false, "")])
    }
}

/// Counts every backend call, optionally failing the warm replays.
#[derive(Default)]
pub struct CountingFactory {
    pub calls: Arc<AtomicU64>,
    pub fail_warm: bool,
}

impl CountingFactory {
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

struct CountingProcessor {
    calls: Arc<AtomicU64>,
    fail_warm: bool,
    context: Option<WorkerContext>,
}

#[async_trait]
impl ProcessorFactory for CountingFactory {
    async fn create_processor(&self) -> Box<dyn Processor> {
        Box::new(CountingProcessor {
            calls: self.calls.clone(),
            fail_warm: self.fail_warm,
            context: None,
        })
    }
}

#[async_trait]
impl Processor for CountingProcessor {
    async fn init(&mut self, context: WorkerContext) -> Result<(), BenchError> {
        self.context = Some(context);
        Ok(())
    }

    async fn process_inference_query(
        &mut self,
        query: InferenceQuery<'_>,
    ) -> Result<Vec<Stat>, BenchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if query.is_warm && self.fail_warm {
            return Err(BenchError::QueryFailed {
                worker: query.worker_index,
                query_number: query.query_number,
                reason: "warm replay rejected".to_owned(),
            });
        }
        let context = self.context.as_ref().expect("processor initialized");
        Ok(vec![context.stat_pool.get().init("Query", 250, 1, false, "")])
    }
}
