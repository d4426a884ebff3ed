//! HTTP client for the text optimization service.
//!
//! One `POST {base_url}/api/optimize` per request, JSON in and out. No retry
//! and no timeout: a hung service keeps the caller waiting.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use super::types::{
    interpret_response, HealthStatus, OptimizationError, OptimizationResult, OptimizeRequest,
};

pub const OPTIMIZE_PATH: &str = "/api/optimize";
pub const HEALTH_PATH: &str = "/api/health";

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Rewrites a text to read more naturally.
#[async_trait]
pub trait TextOptimizer: Send + Sync {
    async fn optimize(&self, text: &str) -> Result<OptimizationResult, OptimizationError>;
}

#[derive(Debug, Clone)]
pub struct OptimizationClient {
    http: Client,
    base_url: String,
}

impl OptimizationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, OPTIMIZE_PATH)
    }

    pub async fn check_health(&self) -> Result<HealthStatus> {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?
            .error_for_status()
            .with_context(|| format!("Health check failed for {url}"))?;

        response
            .json::<HealthStatus>()
            .await
            .context("Failed to parse health response")
    }
}

#[async_trait]
impl TextOptimizer for OptimizationClient {
    async fn optimize(&self, text: &str) -> Result<OptimizationResult, OptimizationError> {
        let url = self.endpoint();
        log_debug!("POST {} ({} chars)", url, text.chars().count());

        let response = self
            .http
            .post(&url)
            .json(&OptimizeRequest {
                text: text.to_string(),
            })
            .send()
            .await
            .map_err(|err| {
                log_warn!("optimize request to {} failed: {}", url, err);
                OptimizationError::from(err)
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        let outcome = interpret_response(status, &body);
        if let Err(err) = &outcome {
            log_warn!("optimize request answered {}: {}", status, err);
        }
        outcome
    }
}
