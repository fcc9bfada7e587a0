//! A file handed to the orchestrator, and the PDF intake check.

use crate::error::ContractReaderError;
use std::path::Path;

/// MIME type of accepted uploads.
pub const PDF_MIME: &str = "application/pdf";

/// An in-memory file ready to be posted as multipart form data.
#[derive(Clone)]
pub struct UploadFile {
    pub name: String,
    /// Reported MIME type. Drag-and-drop on some platforms leaves it empty.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.filter(|t| !t.trim().is_empty()),
            bytes,
        }
    }

    /// Read a local file. The MIME type is inferred from the extension only.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ContractReaderError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ContractReaderError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = has_pdf_extension(&name).then(|| PDF_MIME.to_string());
        Ok(Self::new(name, content_type, bytes))
    }

    /// Accepted when typed `application/pdf` or named `*.pdf` (any case).
    pub fn is_pdf(&self) -> bool {
        let typed_pdf = self
            .content_type
            .as_deref()
            .and_then(|t| t.split(';').next())
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(PDF_MIME));
        typed_pdf || has_pdf_extension(&self.name)
    }

    /// The intake check as a `Result`.
    pub fn ensure_pdf(&self) -> Result<(), ContractReaderError> {
        if self.is_pdf() {
            Ok(())
        } else {
            Err(ContractReaderError::InvalidFileType {
                name: self.name.clone(),
                content_type: self.content_type.clone(),
            })
        }
    }

    /// MIME type for the multipart part.
    pub fn mime(&self) -> &str {
        self.content_type.as_deref().unwrap_or(PDF_MIME)
    }
}

fn has_pdf_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercase_extension_without_mime_is_accepted() {
        let f = UploadFile::new("x.PDF", Some(String::new()), vec![]);
        assert_eq!(f.content_type, None);
        assert!(f.is_pdf());
    }

    #[test]
    fn mime_alone_is_enough() {
        let f = UploadFile::new("scan", Some("application/pdf; charset=binary".into()), vec![]);
        assert!(f.is_pdf());
    }

    #[test]
    fn other_files_are_rejected() {
        let f = UploadFile::new("notes.txt", Some("text/plain".into()), vec![1]);
        let err = f.ensure_pdf().unwrap_err();
        assert!(matches!(err, ContractReaderError::InvalidFileType { .. }));
        assert!(!UploadFile::new("pdf", None, vec![]).is_pdf());
    }

    #[tokio::test]
    async fn from_path_reads_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Contrat.Pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        let f = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(f.name, "Contrat.Pdf");
        assert_eq!(f.content_type.as_deref(), Some(PDF_MIME));
        assert_eq!(f.bytes, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = UploadFile::from_path("/nonexistent/x.pdf").await.unwrap_err();
        assert!(matches!(err, ContractReaderError::ReadFailed { .. }));
    }
}
