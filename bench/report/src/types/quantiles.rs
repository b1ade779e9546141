use crate::utils::round_float;
use serde::{Deserialize, Serialize};

/// Latency quantiles in milliseconds, as reported for a histogram.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct LatencyQuantiles {
    #[serde(serialize_with = "round_float")]
    pub q0: f64,
    #[serde(serialize_with = "round_float")]
    pub q50: f64,
    #[serde(serialize_with = "round_float")]
    pub q95: f64,
    #[serde(serialize_with = "round_float")]
    pub q99: f64,
    #[serde(serialize_with = "round_float")]
    pub q999: f64,
    #[serde(serialize_with = "round_float")]
    pub q100: f64,
}

impl LatencyQuantiles {
    pub fn is_monotonic(&self) -> bool {
        self.q0 <= self.q50
            && self.q50 <= self.q95
            && self.q95 <= self.q99
            && self.q99 <= self.q999
            && self.q999 <= self.q100
    }
}
