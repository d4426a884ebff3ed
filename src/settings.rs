use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
    time::Duration,
};

use crate::detection::DetectionConfig;

pub const DEFAULT_OPTIMIZE_BASE_URL: &str = "http://localhost:5000";
pub const ENV_OPTIMIZE_URL: &str = "PAPERCHECK_OPTIMIZE_URL";
pub const ENV_EXPORT_DIR: &str = "PAPERCHECK_EXPORT_DIR";
pub const DEFAULT_SETTINGS_FILE: &str = "papercheck.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub optimize_base_url: String,
    pub notification_ttl_ms: u64,
    pub detection: DetectionConfig,
    pub export_dir: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            optimize_base_url: DEFAULT_OPTIMIZE_BASE_URL.into(),
            notification_ttl_ms: 5_000,
            detection: DetectionConfig::default(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl AppSettings {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    /// Command-line (or environment) values win over the settings file.
    pub fn apply_overrides(&mut self, optimize_url: Option<String>, export_dir: Option<PathBuf>) {
        if let Some(url) = optimize_url.filter(|url| !url.trim().is_empty()) {
            self.optimize_base_url = url;
        }
        if let Some(dir) = export_dir {
            self.export_dir = dir;
        }
    }
}

pub struct SettingsStore {
    path: Option<PathBuf>,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    /// Loads `path` if it exists; unreadable JSON falls back to defaults.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            AppSettings::default()
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// Store with no backing file; `save` is a no-op.
    pub fn in_memory(settings: AppSettings) -> Self {
        Self {
            path: None,
            data: RwLock::new(settings),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn current(&self) -> AppSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, apply: impl FnOnce(&mut AppSettings)) -> Result<AppSettings> {
        let updated = {
            let mut guard = self
                .data
                .write()
                .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
            apply(&mut guard);
            guard.clone()
        };
        Ok(updated)
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let data = self.current();
        let serialized = serde_json::to_string_pretty(&data)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}
