//! Audio-library name source

mod file_scanner;
mod tag_reader;

pub use file_scanner::{LibraryScanner, ScanError};
pub use tag_reader::{people_from_tag, TagReader};
