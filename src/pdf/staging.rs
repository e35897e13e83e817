use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("failed to create temp file: {0}")]
    Create(#[source] io::Error),
    #[error("failed to write temp file: {0}")]
    Write(#[source] io::Error),
    #[error("failed to delete temp file {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub trait StagedFile {
    fn path(&self) -> &Path;
}

/// Request-scoped storage for uploaded bytes, so a backend can open them by path.
pub trait TransientStore {
    type Handle: StagedFile;

    fn create(&self, bytes: &[u8]) -> Result<Self::Handle, StagingError>;

    /// Remove the staged bytes. A file that is already gone is not an error.
    fn delete(&self, handle: Self::Handle) -> Result<(), StagingError>;
}

#[derive(Debug, Default, Clone)]
pub struct TempFileStore {
    dir: Option<PathBuf>,
}

impl TempFileStore {
    pub fn new(dir: Option<PathBuf>) -> Self {
        TempFileStore { dir }
    }
}

impl StagedFile for NamedTempFile {
    fn path(&self) -> &Path {
        NamedTempFile::path(self)
    }
}

impl TransientStore for TempFileStore {
    type Handle = NamedTempFile;

    fn create(&self, bytes: &[u8]) -> Result<NamedTempFile, StagingError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("pdfpages-").suffix(".pdf");
        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(StagingError::Create)?;

        file.write_all(bytes).map_err(StagingError::Write)?;
        file.flush().map_err(StagingError::Write)?;
        Ok(file)
    }

    fn delete(&self, handle: NamedTempFile) -> Result<(), StagingError> {
        let path = handle.path().to_path_buf();
        match handle.close() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StagingError::Delete { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_writes_bytes_with_pdf_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempFileStore::new(Some(dir.path().to_path_buf()));
        let handle = store.create(b"%PDF-1.5 body").unwrap();

        assert!(handle.path().starts_with(dir.path()));
        assert_eq!(
            handle.path().extension().and_then(|e| e.to_str()),
            Some("pdf")
        );
        assert_eq!(std::fs::read(handle.path()).unwrap(), b"%PDF-1.5 body");
    }

    #[test]
    fn test_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempFileStore::new(Some(dir.path().to_path_buf()));
        let handle = store.create(b"bytes").unwrap();
        let path = handle.path().to_path_buf();

        store.delete(handle).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_delete_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempFileStore::new(Some(dir.path().to_path_buf()));
        let handle = store.create(b"bytes").unwrap();
        std::fs::remove_file(handle.path()).unwrap();

        assert!(store.delete(handle).is_ok());
    }

    #[test]
    fn test_create_in_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempFileStore::new(Some(dir.path().join("nope")));
        assert!(matches!(
            store.create(b"bytes"),
            Err(StagingError::Create(_))
        ));
    }
}
