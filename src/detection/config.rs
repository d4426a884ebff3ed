use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Tunables for the stand-in detection engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectionConfig {
    /// Simulated latency window, milliseconds (uniform, max exclusive)
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,

    /// Raw weight ranges (uniform, upper bound exclusive)
    pub human_range: (f64, f64),
    pub machine_range: (f64, f64),
    pub humanized_range: (f64, f64),
    pub polished_range: (f64, f64),
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: 2_000,
            max_latency_ms: 4_000,
            human_range: (20.0, 50.0),
            machine_range: (30.0, 70.0),
            humanized_range: (5.0, 25.0),
            polished_range: (5.0, 20.0),
        }
    }
}

impl DetectionConfig {
    /// Config with no simulated latency, for tests and one-shot runs.
    pub fn instant() -> Self {
        Self {
            min_latency_ms: 0,
            max_latency_ms: 0,
            ..Self::default()
        }
    }

    pub fn latency_range(&self) -> Range<u64> {
        self.min_latency_ms..self.max_latency_ms.max(self.min_latency_ms)
    }
}
