use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};

use super::file::FileDescriptor;

/// Where the bytes of an attached file come from.
#[derive(Debug, Clone)]
pub enum FileHandle {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FileHandle::Path(a), FileHandle::Path(b)) => a == b,
            (FileHandle::Bytes(a), FileHandle::Bytes(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Builds a descriptor for a file on disk, guessing the mime type from its
/// extension.
pub fn describe_path(path: &Path) -> Result<(FileDescriptor, FileHandle)> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok((
        FileDescriptor::guessed(name, metadata.len()),
        FileHandle::Path(path.to_path_buf()),
    ))
}

/// Reads the whole file as UTF-8, replacing invalid sequences.
pub async fn read_text(handle: &FileHandle) -> Result<String> {
    let bytes = match handle {
        FileHandle::Path(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        FileHandle::Bytes(bytes) => bytes.to_vec(),
    };

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
