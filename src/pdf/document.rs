use lopdf::Document;
use std::path::Path;

use super::{BackendError, PageSource, PdfBackend};

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfBackend;

impl PdfBackend for LopdfBackend {
    type Document = PdfDocument;

    fn open(&self, path: &Path) -> Result<PdfDocument, BackendError> {
        PdfDocument::open(path)
    }
}

pub struct PdfDocument {
    pub doc: Document,
    page_count: u32,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BackendError> {
        let doc = Document::load(&path).map_err(|e| BackendError::Open(e.to_string()))?;
        Self::from_document(doc)
    }

    pub fn from_document(doc: Document) -> Result<Self, BackendError> {
        if doc.is_encrypted() {
            return Err(BackendError::Open(
                "encrypted PDFs are not supported".to_string(),
            ));
        }
        let page_count = doc.get_pages().len() as u32;
        Ok(PdfDocument { doc, page_count })
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn page_text(&self, index: u32) -> Result<String, BackendError> {
        if index >= self.page_count {
            return Err(BackendError::PageOutOfRange {
                index,
                count: self.page_count,
            });
        }

        // lopdf numbers pages from 1
        let page = index + 1;
        self.doc
            .extract_text(&[page])
            .map_err(|e| BackendError::Text {
                page,
                reason: e.to_string(),
            })
    }
}
