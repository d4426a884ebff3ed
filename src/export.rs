use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

pub const EXPORT_MIME: &str = "text/plain; charset=utf-8";
const FILE_PREFIX: &str = "optimized-text_";

/// `optimized-text_<YYYY-MM-DD>.txt`, dated in UTC.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("{FILE_PREFIX}{}.txt", now.format("%Y-%m-%d"))
}

/// Writes `text` into `dir` and returns the file's path.
pub async fn write_export(dir: &Path, text: &str, now: DateTime<Utc>) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    let path = dir.join(export_file_name(now));
    tokio::fs::write(&path, text.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
