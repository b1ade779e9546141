use crate::error::BenchError;
use aibench_report::quantiles::LatencyQuantiles;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hdrhistogram::serialization::{Deserializer, Serializer, V2DeflateSerializer};
use hdrhistogram::Histogram;
use std::fmt::Write as _;
use std::io::Cursor;

pub const LOWEST_TRACKABLE_LATENCY_US: u64 = 1;
pub const HIGHEST_TRACKABLE_LATENCY_US: u64 = 30_000_000;
pub const SIGNIFICANT_FIGURES: u8 = 3;

const MICROS_PER_MILLI: f64 = 1000.0;

/// Latency histogram in microseconds covering 1 µs to 30 s with 3 significant digits.
#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    histogram: Histogram<u64>,
}

impl LatencyHistogram {
    pub fn new() -> Result<Self, BenchError> {
        let histogram = Histogram::new_with_bounds(
            LOWEST_TRACKABLE_LATENCY_US,
            HIGHEST_TRACKABLE_LATENCY_US,
            SIGNIFICANT_FIGURES,
        )
        .map_err(|error| BenchError::CannotCreateHistogram(format!("{error:?}")))?;
        Ok(Self { histogram })
    }

    /// Creates an empty histogram with the same configuration as `other`.
    pub fn empty_like(other: &Self) -> Self {
        Self {
            histogram: Histogram::new_from(&other.histogram),
        }
    }

    /// Values above the ceiling saturate, negative values are recorded as 0.
    pub fn record(&mut self, latency_us: i64) {
        self.histogram.saturating_record(latency_us.max(0) as u64);
    }

    pub fn add(&mut self, other: &Self) -> Result<(), BenchError> {
        self.histogram
            .add(&other.histogram)
            .map_err(|error| BenchError::CannotCreateHistogram(format!("{error:?}")))
    }

    pub fn reset(&mut self) {
        self.histogram.reset();
    }

    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    pub fn value_at_quantile(&self, quantile: f64) -> u64 {
        self.histogram.value_at_quantile(quantile)
    }

    pub fn min(&self) -> u64 {
        self.histogram.min()
    }

    pub fn max(&self) -> u64 {
        self.histogram.max()
    }

    pub fn mean(&self) -> f64 {
        self.histogram.mean()
    }

    pub fn stdev(&self) -> f64 {
        self.histogram.stdev()
    }

    pub fn quantiles(&self) -> LatencyQuantiles {
        let millis = |quantile: f64| self.value_at_quantile(quantile) as f64 / MICROS_PER_MILLI;
        LatencyQuantiles {
            q0: millis(0.0),
            q50: millis(0.50),
            q95: millis(0.95),
            q99: millis(0.99),
            q999: millis(0.999),
            q100: millis(1.0),
        }
    }

    /// Encodes as base64 of the V2 DEFLATE serialization.
    pub fn encode(&self) -> Result<String, BenchError> {
        let mut buffer = Vec::new();
        V2DeflateSerializer::new()
            .serialize(&self.histogram, &mut buffer)
            .map_err(|error| BenchError::CannotEncodeHistogram(format!("{error:?}")))?;
        Ok(STANDARD.encode(buffer))
    }

    pub fn decode(encoded: &str) -> Result<Self, BenchError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|error| BenchError::CannotDecodeHistogram(error.to_string()))?;
        let histogram = Deserializer::new()
            .deserialize(&mut Cursor::new(bytes))
            .map_err(|error| BenchError::CannotDecodeHistogram(format!("{error:?}")))?;
        Ok(Self { histogram })
    }

    /// Full resolution percentile distribution, values divided by `value_scale`.
    pub fn percentile_distribution(
        &self,
        ticks_per_half_distance: u32,
        value_scale: f64,
    ) -> String {
        let mut output = String::new();
        let _ = write!(
            output,
            "{:>12} {:>14} {:>10} {:>14}\n\n",
            "Value", "Percentile", "TotalCount", "1/(1-Percentile)"
        );

        let mut total_count = 0u64;
        for step in self.histogram.iter_quantiles(ticks_per_half_distance) {
            total_count += step.count_since_last_iteration();
            let percentile = step.quantile_iterated_to();
            let inverted = 1.0 / (1.0 - percentile);
            let inverted = if inverted.is_infinite() {
                format!("{:>14}", "inf")
            } else {
                format!("{inverted:>14.2}")
            };
            let _ = writeln!(
                output,
                "{:>12.3} {:>14.6} {:>10} {}",
                step.value_iterated_to() as f64 / value_scale,
                percentile,
                total_count,
                inverted
            );
        }

        let _ = writeln!(
            output,
            "#[Mean    = {:>12.3}, StdDeviation   = {:>12.3}]",
            self.mean() / value_scale,
            self.stdev() / value_scale
        );
        let _ = writeln!(
            output,
            "#[Max     = {:>12.3}, Total count    = {:>12}]",
            self.max() as f64 / value_scale,
            self.len()
        );
        let _ = writeln!(
            output,
            "#[Buckets = {:>12}, SubBuckets     = {:>12}]",
            self.histogram.buckets(),
            sub_bucket_count(SIGNIFICANT_FIGURES)
        );
        output
    }
}

fn sub_bucket_count(significant_figures: u8) -> u64 {
    (2 * 10u64.pow(significant_figures as u32)).next_power_of_two()
}
