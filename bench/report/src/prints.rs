use crate::test_result::TestResult;
use colored::{Color, ColoredString, Colorize};
use human_repr::HumanCount;
use tracing::info;

impl TestResult {
    pub fn print_summary(&self) {
        let limit = match self.limit {
            0 => "all".to_owned(),
            limit => limit.human_count_bare().to_string(),
        };
        let max_rps = match self.max_rps {
            0 => "unlimited".to_owned(),
            rps => format!("{rps} req/s"),
        };
        let params_print = format!(
            "Benchmark: {}, workers: {}, limit: {}, burn-in: {}, items per record: {}, rate limit: {}",
            self.kind, self.workers, limit, self.burn_in, self.tensor_batch_size, max_rps,
        )
        .blue();

        info!("{}", params_print);
        info!("{}", self.formatted_string());
    }

    pub fn formatted_string(&self) -> ColoredString {
        let color = if self.totals.timed_out > 0 {
            Color::Yellow
        } else {
            Color::Green
        };
        let quantiles = &self.overall_quantiles.all_queries;

        format!(
            "Results: {} {} in {:.3} s, overall rate: {:.2} {}/s, timed out: {}, \
            p50 latency: {:.3} ms, p95 latency: {:.3} ms, p99 latency: {:.3} ms, \
            p999 latency: {:.3} ms, max latency: {:.3} ms",
            self.totals.items_processed,
            self.kind.unit(),
            self.duration_millis as f64 / 1000.0,
            self.overall_rates.overall_ops_rate,
            self.kind.unit(),
            self.totals.timed_out,
            quantiles.q50,
            quantiles.q95,
            quantiles.q99,
            quantiles.q999,
            quantiles.q100,
        )
        .color(color)
    }
}
