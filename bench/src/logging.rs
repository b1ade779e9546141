use crate::error::BenchError;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Keeps the non-blocking writers flushing until dropped at the end of `main`.
#[derive(Default)]
pub struct Logging {
    stderr_guard: Option<WorkerGuard>,
    file_guard: Option<WorkerGuard>,
}

impl Logging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Console output is filtered by `RUST_LOG` (default `info`, `debug` when `debug > 0`),
    /// the optional log file receives everything.
    pub fn init(&mut self, debug: u8, log_file: Option<&Path>) -> Result<&mut Self, BenchError> {
        let default_level = if debug > 0 { "debug" } else { "info" };
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());
        self.stderr_guard = Some(stderr_guard);
        let mut layers = vec![fmt::layer()
            .with_target(false)
            .with_writer(stderr_writer)
            .with_filter(env_filter)
            .boxed()];

        if let Some(path) = log_file {
            let _ = std::fs::remove_file(path);
            let directory = path.parent().unwrap_or_else(|| Path::new(""));
            let file_name = path
                .file_name()
                .ok_or_else(|| {
                    BenchError::CannotInitializeLogging(format!(
                        "{} is not a file",
                        path.display()
                    ))
                })?;
            let file_appender = tracing_appender::rolling::never(directory, file_name);
            let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
            self.file_guard = Some(file_guard);
            layers.push(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(file_writer)
                    .with_filter(LevelFilter::TRACE)
                    .boxed(),
            );
        }

        Registry::default()
            .with(layers)
            .try_init()
            .map_err(|error| BenchError::CannotInitializeLogging(error.to_string()))?;
        Ok(self)
    }
}
