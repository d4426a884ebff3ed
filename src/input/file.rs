use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upload ceiling: 10 MiB.
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

pub const MIME_TEXT_PLAIN: &str = "text/plain";
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

pub const ALLOWED_MIME_TYPES: &[&str] = &[
    MIME_TEXT_PLAIN,
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/pdf",
];

pub const ALLOWED_EXTENSIONS: &[&str] = &[".txt", ".doc", ".docx", ".pdf"];

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationError {
    #[error("Unsupported file format. Please choose a .txt, .doc, .docx or .pdf file")]
    UnsupportedFormat,
    #[error("File size cannot exceed 10MB")]
    FileTooLarge,
    #[error("Text is too short, at least 50 characters are required")]
    TextTooShort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    /// Lower-cased, with its leading dot; empty when the name has no dot.
    pub extension: String,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size_bytes: u64, mime_type: impl Into<String>) -> Self {
        let name = name.into();
        let extension = extension_of(&name);
        Self {
            name,
            size_bytes,
            mime_type: mime_type.into(),
            extension,
        }
    }

    /// Descriptor whose mime type is inferred from the extension.
    pub fn guessed(name: impl Into<String>, size_bytes: u64) -> Self {
        let name = name.into();
        let mime = mime_for_extension(&extension_of(&name));
        Self::new(name, size_bytes, mime)
    }

    pub fn is_plain_text(&self) -> bool {
        self.mime_type == MIME_TEXT_PLAIN
    }

    /// `name (size)` label shown next to an attached file.
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.name, format_file_size(self.size_bytes))
    }
}

/// Substring after the last `.` of `name`, lower-cased and prefixed with `.`.
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => format!(".{}", ext.to_lowercase()),
        None => String::new(),
    }
}

pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        ".txt" => MIME_TEXT_PLAIN,
        ".doc" => "application/msword",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".pdf" => "application/pdf",
        _ => MIME_OCTET_STREAM,
    }
}

/// Format check first, size second.
pub fn validate(descriptor: &FileDescriptor) -> Result<(), ValidationError> {
    let mime_ok = ALLOWED_MIME_TYPES.contains(&descriptor.mime_type.as_str());
    let ext_ok = ALLOWED_EXTENSIONS.contains(&descriptor.extension.as_str());
    if !mime_ok && !ext_ok {
        return Err(ValidationError::UnsupportedFormat);
    }

    if descriptor.size_bytes > MAX_FILE_BYTES {
        return Err(ValidationError::FileTooLarge);
    }

    Ok(())
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let bytes = bytes as f64;
    let exponent = ((bytes.ln() / 1024f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes / 1024f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exponent])
}
