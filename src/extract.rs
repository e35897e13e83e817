use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::page_range::{parse_page_spec, PageSpecError};
use crate::pdf::{
    LopdfBackend, PageSource, PdfBackend, StagedFile, TempFileStore, TransientStore,
};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("only PDF files are supported")]
    UnsupportedFileType,
    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },
    #[error(transparent)]
    PageSpec(#[from] PageSpecError),
    #[error("failed to open PDF: {0}")]
    DocumentOpen(String),
    #[error("{0}")]
    Internal(String),
}

impl ExtractError {
    /// HTTP-style status a transport should report for this error.
    pub fn status(&self) -> u16 {
        match self {
            ExtractError::UnsupportedFileType | ExtractError::PageSpec(_) => 400,
            ExtractError::PayloadTooLarge { .. } => 413,
            ExtractError::DocumentOpen(_) | ExtractError::Internal(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub filename: String,
    pub pages: IndexMap<String, String>,
    pub extracted_text: String,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub max_upload_bytes: usize,
    pub temp_dir: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            temp_dir: None,
        }
    }
}

pub struct Extractor<B = LopdfBackend, S = TempFileStore> {
    backend: B,
    store: S,
    max_upload_bytes: usize,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Extractor::with_parts(
            LopdfBackend,
            TempFileStore::new(config.temp_dir),
            config.max_upload_bytes,
        )
    }
}

impl<B: PdfBackend, S: TransientStore> Extractor<B, S> {
    pub fn with_parts(backend: B, store: S, max_upload_bytes: usize) -> Self {
        Extractor {
            backend,
            store,
            max_upload_bytes,
        }
    }

    /// Extract the text of the pages selected by `pages_spec` from an uploaded PDF.
    ///
    /// The staged file and the open document are released on every path out of
    /// this function, including panics inside the backend.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn extract(
        &self,
        bytes: &[u8],
        filename: &str,
        pages_spec: &str,
    ) -> Result<ExtractionResult, ExtractError> {
        if !has_pdf_extension(filename) {
            return Err(ExtractError::UnsupportedFileType);
        }
        if bytes.len() > self.max_upload_bytes {
            return Err(ExtractError::PayloadTooLarge {
                size: bytes.len(),
                limit: self.max_upload_bytes,
            });
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.extract_scoped(bytes, filename, pages_spec)
        }));

        match outcome {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(error = %message, "panic during extraction");
                Err(ExtractError::Internal(format!(
                    "panic during extraction: {}",
                    message
                )))
            }
        }
    }

    fn extract_scoped(
        &self,
        bytes: &[u8],
        filename: &str,
        pages_spec: &str,
    ) -> Result<ExtractionResult, ExtractError> {
        let staged = self
            .store
            .create(bytes)
            .map_err(|e| ExtractError::Internal(e.to_string()))?;
        let mut scope = ExtractionScope::new(&self.store, staged);
        tracing::debug!(path = %scope.path().display(), "upload staged");

        let doc = self
            .backend
            .open(scope.path())
            .map_err(|e| ExtractError::DocumentOpen(e.to_string()))?;
        let doc = scope.attach(doc);

        let max_page = doc.page_count();
        let selected = parse_page_spec(pages_spec, max_page)?;
        tracing::debug!(max_page, selected = %selected, "page spec resolved");

        let mut pages = IndexMap::with_capacity(selected.len());
        let mut texts = Vec::with_capacity(selected.len());
        let mut warnings = Vec::new();

        for page in selected.iter() {
            let text = doc
                .page_text(page - 1)
                .map_err(|e| ExtractError::Internal(e.to_string()))?;

            if text.trim().is_empty() {
                tracing::warn!(page, "page has no extractable text");
                warnings.push(format!("page {} seems empty or scanned; consider OCR", page));
            }
            pages.insert(page.to_string(), text.clone());
            texts.push(text);
        }

        drop(scope);

        tracing::info!(
            filename,
            max_page,
            selected = selected.len(),
            warnings = warnings.len(),
            "PDF text extraction complete"
        );

        Ok(ExtractionResult {
            filename: filename.to_string(),
            pages,
            extracted_text: texts.join("\n\n"),
            warnings,
        })
    }
}

/// Owns the staged upload and the document opened from it. Dropping the scope
/// closes the document first, then deletes the staged file.
struct ExtractionScope<'a, S: TransientStore, D> {
    store: &'a S,
    path: PathBuf,
    staged: Option<S::Handle>,
    doc: Option<D>,
}

impl<'a, S: TransientStore, D> ExtractionScope<'a, S, D> {
    fn new(store: &'a S, staged: S::Handle) -> Self {
        ExtractionScope {
            store,
            path: staged.path().to_path_buf(),
            staged: Some(staged),
            doc: None,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn attach(&mut self, doc: D) -> &D {
        self.doc.insert(doc)
    }
}

impl<S: TransientStore, D> Drop for ExtractionScope<'_, S, D> {
    fn drop(&mut self) {
        drop(self.doc.take());
        if let Some(staged) = self.staged.take() {
            if let Err(e) = self.store.delete(staged) {
                tracing::warn!(error = %e, "failed to remove staged upload");
            }
        }
    }
}

fn has_pdf_extension(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
