use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::text::{char_len, split_word_count};

use super::engine::RawWeights;

/// Normalized category shares in percent, unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shares {
    pub human: f64,
    pub machine: f64,
    pub humanized: f64,
    pub polished: f64,
}

impl Shares {
    pub fn total(&self) -> f64 {
        self.human + self.machine + self.humanized + self.polished
    }

    /// Machine-generated plus machine-generated-then-humanized, unrounded.
    pub fn ai_share(&self) -> f64 {
        self.machine + self.humanized
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub ai_probability: u8,
    pub human_score: u8,
    pub machine_score: u8,
    pub humanized_score: u8,
    pub polished_score: u8,
    pub text_length: usize,
    pub word_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl DetectionResult {
    pub fn displayed_total(&self) -> u32 {
        self.human_score as u32
            + self.machine_score as u32
            + self.humanized_score as u32
            + self.polished_score as u32
    }
}

/// Scale the weights so they sum to 100.
pub fn normalize(weights: &RawWeights) -> Result<Shares> {
    let parts = [
        weights.human,
        weights.machine,
        weights.humanized,
        weights.polished,
    ];
    if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
        bail!("detection weights must be finite and non-negative: {weights:?}");
    }

    let total = weights.total();
    if total <= 0.0 {
        bail!("detection weights sum to zero");
    }

    Ok(Shares {
        human: weights.human / total * 100.0,
        machine: weights.machine / total * 100.0,
        humanized: weights.humanized / total * 100.0,
        polished: weights.polished / total * 100.0,
    })
}

fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Builds the report for `text`. `ai_probability` is rounded from the
/// unrounded machine + humanized share; the four category scores are each
/// rounded on their own, so they need not add up to exactly 100.
pub fn build_result(text: &str, weights: &RawWeights, now: DateTime<Utc>) -> Result<DetectionResult> {
    let shares = normalize(weights)?;

    Ok(DetectionResult {
        ai_probability: percent(shares.ai_share()),
        human_score: percent(shares.human),
        machine_score: percent(shares.machine),
        humanized_score: percent(shares.humanized),
        polished_score: percent(shares.polished),
        text_length: char_len(text),
        word_count: split_word_count(text),
        timestamp: now,
    })
}
