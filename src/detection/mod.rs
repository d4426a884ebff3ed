pub mod config;
pub mod engine;
pub mod scoring;

pub use config::DetectionConfig;
pub use engine::{DetectionEngine, FixedDetectionEngine, RandomDetectionEngine, RawWeights};
pub use scoring::{build_result, normalize, DetectionResult, Shares};
