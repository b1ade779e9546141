pub mod args;
pub mod benchmark_runner;
pub mod error;
pub mod generator;
pub mod load_runner;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod processor;
pub mod processors;
pub mod producer;
pub mod rate_limiter;
pub mod reporter;
pub mod run_config;
pub mod statistics;
pub mod utils;
