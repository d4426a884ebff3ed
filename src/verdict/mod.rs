pub mod guidance;

use serde::Serialize;

use crate::detection::DetectionResult;

pub use guidance::{GuidanceBundle, Suggestion, SuggestionCategory};

pub const MEDIUM_THRESHOLD: u8 = 30;
pub const HIGH_THRESHOLD: u8 = 70;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    /// Boundaries belong to the higher tier.
    pub fn from_probability(ai_probability: u8) -> Self {
        if ai_probability < MEDIUM_THRESHOLD {
            Tier::Low
        } else if ai_probability < HIGH_THRESHOLD {
            Tier::Medium
        } else {
            Tier::High
        }
    }

    pub fn guidance(&self) -> &'static GuidanceBundle {
        match self {
            Tier::Low => &guidance::LOW,
            Tier::Medium => &guidance::MEDIUM,
            Tier::High => &guidance::HIGH,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub tier: Tier,
    pub ai_probability: u8,
    pub label: &'static str,
    pub detail: &'static str,
    pub headline: &'static str,
    pub summary: &'static str,
    pub suggestions: &'static [Suggestion],
}

pub fn classify(ai_probability: u8) -> Verdict {
    let tier = Tier::from_probability(ai_probability);
    let bundle = tier.guidance();
    Verdict {
        tier,
        ai_probability,
        label: bundle.label,
        detail: bundle.detail,
        headline: bundle.headline,
        summary: bundle.summary,
        suggestions: bundle.suggestions,
    }
}

pub fn verdict_for(result: &DetectionResult) -> Verdict {
    classify(result.ai_probability)
}
