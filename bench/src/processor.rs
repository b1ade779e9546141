use crate::error::BenchError;
use crate::statistics::stat::{Stat, StatPool};
use crate::utils::counters::RunCounters;
use async_trait::async_trait;
use std::sync::Arc;

/// Everything a backend unit gets from the engine when its worker starts.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub worker_index: usize,
    pub total_workers: usize,
    pub counters: Arc<RunCounters>,
    pub stat_pool: Arc<StatPool>,
    pub debug: u8,
    pub print_responses: bool,
}

/// One invocation of an inference processor.
#[derive(Debug, Clone, Copy)]
pub struct InferenceQuery<'a> {
    pub record: &'a [u8],
    pub is_warm: bool,
    pub worker_index: usize,
    pub use_reference_data_redis: bool,
    pub use_reference_data_mysql: bool,
    pub query_number: u64,
}

/// Backend client turning one record into latency measurements.
///
/// Every worker owns its own instance, connection sharing is up to the implementation.
#[async_trait]
pub trait Processor: Send {
    async fn init(&mut self, context: WorkerContext) -> Result<(), BenchError>;

    async fn process_inference_query(
        &mut self,
        query: InferenceQuery<'_>,
    ) -> Result<Vec<Stat>, BenchError>;

    async fn close(&mut self) -> Result<(), BenchError> {
        Ok(())
    }
}

#[async_trait]
pub trait ProcessorFactory: Send + Sync {
    async fn create_processor(&self) -> Box<dyn Processor>;
}

/// Data-population variant of [`Processor`].
#[async_trait]
pub trait Loader: Send {
    async fn init(&mut self, context: WorkerContext) -> Result<(), BenchError>;

    /// Returns the measurements and the number of backend commands issued.
    async fn process_load_query(
        &mut self,
        record: &[u8],
        debug: u8,
    ) -> Result<(Vec<Stat>, u64), BenchError>;

    async fn close(&mut self) -> Result<(), BenchError> {
        Ok(())
    }
}

#[async_trait]
pub trait LoaderFactory: Send + Sync {
    async fn create_loader(&self) -> Box<dyn Loader>;
}

/// Source of server side metrics polled once per reporting period.
#[async_trait]
pub trait MetricCollector: Send {
    /// Returns the collection timestamp (unix nanoseconds) and the metrics.
    async fn collect_run_time_metrics(&mut self) -> Result<(i64, serde_json::Value), BenchError>;
}
