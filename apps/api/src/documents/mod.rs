// Document collaborators: text extraction from uploaded resumes and DOCX assembly.
// Both are CPU-bound and run inside tokio::task::spawn_blocking.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod docx;
pub mod pdf;

pub use docx::DocxAssembler;
pub use pdf::PdfExtractor;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported document type: {0}")]
    Unsupported(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Document contains no extractable text")]
    Empty,

    #[error("Document assembly failed: {0}")]
    Assembly(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A file uploaded through the transport.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn is_pdf(&self) -> bool {
        self.file_name.to_lowercase().ends_with(".pdf")
    }
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, DocumentError>;
}

/// Contact line of the assembled resume. The dialogue does not collect these
/// yet, so every field is optional and omitted when absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactFields {
    pub phone: Option<String>,
    pub age: Option<String>,
    pub email: Option<String>,
}

impl ContactFields {
    /// "Phone: ..  Age: ..  Email: .." with missing parts skipped.
    pub fn line(&self) -> Option<String> {
        let parts: Vec<String> = [
            ("Phone", self.phone.as_deref()),
            ("Age", self.age.as_deref()),
            ("Email", self.email.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| format!("{label}: {v}")))
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("  "))
        }
    }
}

/// Everything the assembler needs to lay out one resume.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDocument {
    pub name: String,
    pub contacts: ContactFields,
    pub education: Option<String>,
    /// One resume-ready paragraph per project, in dialogue order.
    pub projects: Vec<String>,
    pub skills: String,
    pub achievements: String,
    pub extra: Option<String>,
}

#[async_trait]
pub trait DocumentAssembler: Send + Sync {
    async fn assemble(&self, document: ResumeDocument) -> Result<Vec<u8>, DocumentError>;
}
