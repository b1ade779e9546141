use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Cannot open input file {path}: {source}")]
    CannotOpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("IO error")]
    IoError(#[from] io::Error),
    #[error("Input stream is corrupted: record #{record} is truncated, expected {expected} bytes but read {read}")]
    TruncatedRecord {
        record: u64,
        expected: usize,
        read: usize,
    },
    #[error("Query #{query_number} failed on worker {worker}: {reason}")]
    QueryFailed {
        worker: usize,
        query_number: u64,
        reason: String,
    },
    #[error("Runtime metrics collection failed: {0}")]
    MetricCollectionFailed(String),
    #[error("Cannot create histogram: {0}")]
    CannotCreateHistogram(String),
    #[error("Cannot encode histogram: {0}")]
    CannotEncodeHistogram(String),
    #[error("Cannot decode histogram: {0}")]
    CannotDecodeHistogram(String),
    #[error("Cannot serialize results")]
    CannotSerializeResults(#[from] serde_json::Error),
    #[error("Cannot write to file {path}: {source}")]
    CannotWriteToFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Background task failed: {0}")]
    TaskFailed(#[from] JoinError),
    #[error("Dispatch channel closed before all records were sent")]
    DispatchChannelClosed,
    #[error("Stat channel closed while workers were still running")]
    StatChannelClosed,
    #[error("Cannot initialize logging: {0}")]
    CannotInitializeLogging(String),
}
