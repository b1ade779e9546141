pub mod host_metrics;
pub mod synthetic;
