pub mod client;
pub mod stats;
pub mod types;

pub use client::{OptimizationClient, TextOptimizer, HEALTH_PATH, OPTIMIZE_PATH};
pub use stats::TextStats;
pub use types::{
    interpret_response, HealthStatus, OptimizationError, OptimizationResult, OptimizeRequest,
    OptimizeResponse,
};
