use super::quantiles::LatencyQuantiles;
use crate::utils::round_float;
use serde::{Deserialize, Serialize};

/// One periodic client-side snapshot, built from the interval since the previous tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ClientRunTimeStats {
    #[serde(serialize_with = "round_float")]
    pub inference_rate: f64,
    #[serde(serialize_with = "round_float")]
    pub test_time: f64,
    pub total_inferences: u64,
    #[serde(serialize_with = "round_float")]
    pub overall_rate: f64,
    pub quantiles: LatencyQuantiles,
    pub overall_quantiles: LatencyQuantiles,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded_histogram: Option<String>,
}
