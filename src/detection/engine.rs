use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::DetectionConfig;

/// Four non-negative category weights, not yet normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWeights {
    pub human: f64,
    pub machine: f64,
    pub humanized: f64,
    pub polished: f64,
}

impl RawWeights {
    pub fn new(human: f64, machine: f64, humanized: f64, polished: f64) -> Self {
        Self {
            human,
            machine,
            humanized,
            polished,
        }
    }

    pub fn total(&self) -> f64 {
        self.human + self.machine + self.humanized + self.polished
    }
}

/// Scores a text into raw category weights. Implementations may suspend for
/// as long as they need.
#[async_trait]
pub trait DetectionEngine: Send + Sync {
    async fn score(&self, text: &str) -> Result<RawWeights>;
}

/// Stand-in engine: sleeps for a random latency, then draws each weight
/// uniformly from its configured range.
#[derive(Debug, Clone, Default)]
pub struct RandomDetectionEngine {
    config: DetectionConfig,
}

impl RandomDetectionEngine {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }
}

fn sample(rng: &mut impl Rng, (low, high): (f64, f64)) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

#[async_trait]
impl DetectionEngine for RandomDetectionEngine {
    async fn score(&self, _text: &str) -> Result<RawWeights> {
        // ThreadRng is not Send, so draw everything before suspending.
        let (latency_ms, weights) = {
            let mut rng = rand::thread_rng();
            let latency = self.config.latency_range();
            let latency_ms = if latency.is_empty() {
                latency.start
            } else {
                rng.gen_range(latency)
            };
            let weights = RawWeights::new(
                sample(&mut rng, self.config.human_range),
                sample(&mut rng, self.config.machine_range),
                sample(&mut rng, self.config.humanized_range),
                sample(&mut rng, self.config.polished_range),
            );
            (latency_ms, weights)
        };

        if latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(latency_ms)).await;
        }

        Ok(weights)
    }
}

/// Deterministic engine returning the same weights for every text.
#[derive(Debug, Clone, Copy)]
pub struct FixedDetectionEngine {
    weights: RawWeights,
}

impl FixedDetectionEngine {
    pub fn new(weights: RawWeights) -> Self {
        Self { weights }
    }
}

#[async_trait]
impl DetectionEngine for FixedDetectionEngine {
    async fn score(&self, _text: &str) -> Result<RawWeights> {
        Ok(self.weights)
    }
}
