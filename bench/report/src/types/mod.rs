pub mod hardware;
pub mod quantiles;
pub mod run_kind;
pub mod run_time_stats;
pub mod test_result;
