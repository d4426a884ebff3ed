use serde::{Deserialize, Serialize};

use super::file::{validate, FileDescriptor, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Text,
    File,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Text => "text",
            SourceKind::File => "file",
        }
    }
}

/// Identity of one file selection. A read completion only lands if its ticket
/// still matches the attached file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FileTicket(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum Extraction {
    Pending,
    Ready(String),
    Failed(String),
    /// Accepted format with no client-side extraction path.
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachedFile {
    pub descriptor: FileDescriptor,
    pub ticket: FileTicket,
    pub extraction: Extraction,
}

impl AttachedFile {
    pub fn extracted_text(&self) -> Option<&str> {
        match &self.extraction {
            Extraction::Ready(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InputSource {
    Text { value: String },
    File { file: Option<AttachedFile> },
}

impl Default for InputSource {
    fn default() -> Self {
        InputSource::Text {
            value: String::new(),
        }
    }
}

impl InputSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            InputSource::Text { .. } => SourceKind::Text,
            InputSource::File { .. } => SourceKind::File,
        }
    }

    /// Empty source of the given kind; the other kind's state is dropped.
    pub fn empty(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Text => Self::default(),
            SourceKind::File => InputSource::File { file: None },
        }
    }

    pub fn attached_file(&self) -> Option<&AttachedFile> {
        match self {
            InputSource::File { file } => file.as_ref(),
            InputSource::Text { .. } => None,
        }
    }

    /// Text that detection or optimization would run on, if any exists yet.
    pub fn canonical_text(&self) -> Option<&str> {
        match self {
            InputSource::Text { value } => Some(value.as_str()),
            InputSource::File { file } => file.as_ref().and_then(AttachedFile::extracted_text),
        }
    }
}

pub fn set_text_input(raw: impl Into<String>) -> InputSource {
    InputSource::Text { value: raw.into() }
}

/// Validates `descriptor` and builds the attachment for `ticket`. Plain text
/// starts out `Pending` until its read completes; anything else can never be
/// extracted here.
pub fn set_file_input(
    descriptor: FileDescriptor,
    ticket: FileTicket,
) -> Result<AttachedFile, ValidationError> {
    validate(&descriptor)?;

    let extraction = if descriptor.is_plain_text() {
        Extraction::Pending
    } else {
        Extraction::Unsupported
    };

    Ok(AttachedFile {
        descriptor,
        ticket,
        extraction,
    })
}
