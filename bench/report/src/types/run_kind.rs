use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize, Default)]
pub enum RunKind {
    #[default]
    #[display("Inference")]
    #[serde(rename = "inference")]
    Inference,
    #[display("Load")]
    #[serde(rename = "load")]
    Load,
}

impl RunKind {
    /// Noun used for one logical item in human-readable output.
    pub fn unit(&self) -> &'static str {
        match self {
            RunKind::Inference => "inferences",
            RunKind::Load => "inserts",
        }
    }
}
