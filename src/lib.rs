pub mod utils;
pub mod cli;
pub mod detection;
pub mod export;
pub mod input;
pub mod notifications;
pub mod optimize;
pub mod readiness;
pub mod settings;
pub mod verdict;
pub mod workflow;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use detection::DetectionEngine;
use optimize::OptimizationClient;
use settings::SettingsStore;
use workflow::{WorkflowController, WorkflowDeps};

pub struct AppState {
    pub settings: SettingsStore,
    pub optimizer: Arc<OptimizationClient>,
}

impl AppState {
    pub fn new(settings: SettingsStore) -> Self {
        let optimizer = Arc::new(OptimizationClient::new(
            settings.current().optimize_base_url,
        ));
        Self {
            settings,
            optimizer,
        }
    }

    /// Fresh session wired to the configured optimizer. Must be called
    /// inside a tokio runtime.
    pub fn workflow(&self, detection: Arc<dyn DetectionEngine>) -> WorkflowController {
        let settings = self.settings.current();
        WorkflowController::spawn(WorkflowDeps {
            detection,
            optimizer: self.optimizer.clone(),
            notification_ttl: settings.notification_ttl(),
            export_dir: settings.export_dir,
        })
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    utils::logging::init(cli.debug);

    log::debug!("PaperCheck starting up...");

    let settings = SettingsStore::new(cli.config.clone())?;
    settings.update(|s| s.apply_overrides(cli.optimize_url.clone(), cli.export_dir.clone()))?;
    let state = AppState::new(settings);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;

    runtime.block_on(cli::execute(cli, state))
}
