pub mod document;
pub mod staging;

use std::path::Path;

use thiserror::Error;

pub use document::{LopdfBackend, PdfDocument};
pub use staging::{StagedFile, TempFileStore, TransientStore};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    Open(String),
    #[error("page index {index} is out of range (document has {count} pages)")]
    PageOutOfRange { index: u32, count: u32 },
    #[error("failed to extract text from page {page}: {reason}")]
    Text { page: u32, reason: String },
}

/// Opens documents by path. Implemented by the lopdf backend and by test fakes.
pub trait PdfBackend {
    type Document: PageSource;

    fn open(&self, path: &Path) -> Result<Self::Document, BackendError>;
}

/// An open document. Dropping it releases the handle.
pub trait PageSource {
    fn page_count(&self) -> u32;

    /// Plain text of the page at a 0-based index
    fn page_text(&self, index: u32) -> Result<String, BackendError>;
}
