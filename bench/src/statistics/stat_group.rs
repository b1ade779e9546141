use crate::error::BenchError;
use crate::statistics::histogram::LatencyHistogram;
use crate::statistics::stat::Stat;
use aibench_report::quantiles::LatencyQuantiles;
use std::collections::BTreeMap;
use std::io::{self, Write};

const MICROS_PER_MILLI: f64 = 1000.0;
const FULL_HISTOGRAM_TICKS: u32 = 100;

/// Aggregate of every measurement reported under one label.
#[derive(Debug, Clone)]
pub struct StatGroup {
    histogram: LatencyHistogram,
    count: u64,
    timed_out_count: u64,
    sum_total_results: u64,
}

impl StatGroup {
    pub fn new() -> Result<Self, BenchError> {
        Ok(Self::with_histogram(LatencyHistogram::new()?))
    }

    /// Empty group with the same histogram configuration as `other`.
    pub fn empty_like(other: &Self) -> Self {
        Self::with_histogram(LatencyHistogram::empty_like(&other.histogram))
    }

    fn with_histogram(histogram: LatencyHistogram) -> Self {
        Self {
            histogram,
            count: 0,
            timed_out_count: 0,
            sum_total_results: 0,
        }
    }

    pub fn push(&mut self, stat: &Stat) {
        self.histogram.record(stat.latency_us());
        self.sum_total_results += stat.total_results();
        if stat.timed_out() {
            self.timed_out_count += 1;
        }
        self.count += 1;
    }

    pub fn reset(&mut self) {
        self.histogram.reset();
        self.count = 0;
        self.timed_out_count = 0;
        self.sum_total_results = 0;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn timed_out_count(&self) -> u64 {
        self.timed_out_count
    }

    pub fn sum_total_results(&self) -> u64 {
        self.sum_total_results
    }

    pub fn histogram(&self) -> &LatencyHistogram {
        &self.histogram
    }

    pub fn quantiles(&self) -> LatencyQuantiles {
        self.histogram.quantiles()
    }

    pub fn encode(&self) -> Result<String, BenchError> {
        self.histogram.encode()
    }

    pub fn statistical_summary(&self) -> String {
        let millis = |value: u64| value as f64 / MICROS_PER_MILLI;
        format!(
            "+ Inference execution latency (statistical histogram):\n\tmin: {:8.2} ms,  mean: {:8.2} ms, \
            q25: {:8.2} ms, med(q50): {:8.2} ms, q75: {:8.2} ms, q99: {:8.2} ms, max: {:8.2} ms, \
            stddev: {:8.2}ms, count: {}, timedOut count: {}\n",
            millis(self.histogram.min()),
            self.histogram.mean() / MICROS_PER_MILLI,
            millis(self.histogram.value_at_quantile(0.25)),
            millis(self.histogram.value_at_quantile(0.50)),
            millis(self.histogram.value_at_quantile(0.75)),
            millis(self.histogram.value_at_quantile(0.99)),
            millis(self.histogram.max()),
            self.histogram.stdev() / MICROS_PER_MILLI,
            self.count,
            self.timed_out_count,
        )
    }

    pub fn full_histogram(&self) -> String {
        self.histogram
            .percentile_distribution(FULL_HISTOGRAM_TICKS, MICROS_PER_MILLI)
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{}", self.statistical_summary())
    }
}

/// Writes every group sorted by label, labels right-padded to the longest one.
pub fn write_stat_group_map<W: Write>(
    writer: &mut W,
    groups: &BTreeMap<String, StatGroup>,
) -> io::Result<()> {
    let width = groups.keys().map(|label| label.len()).max().unwrap_or(0);
    for (label, group) in groups {
        writeln!(writer, "{label:<width$}:")?;
        group.write(writer)?;
    }
    Ok(())
}
