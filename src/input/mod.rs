pub mod file;
pub mod reader;
pub mod source;

pub use file::{format_file_size, FileDescriptor, ValidationError, MAX_FILE_BYTES};
pub use reader::{describe_path, read_text, FileHandle};
pub use source::{
    set_file_input, set_text_input, AttachedFile, Extraction, FileTicket, InputSource, SourceKind,
};
