use async_trait::async_trait;
use tracing::info;

use crate::documents::{DocumentError, DocumentExtractor, UploadedDocument};

/// Extracts plain text from PDF resumes.
pub struct PdfExtractor;

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, DocumentError> {
        if !document.is_pdf() {
            return Err(DocumentError::Unsupported(document.file_name.clone()));
        }

        let bytes = document.bytes.clone();
        // pdf-extract can panic on malformed input; spawn_blocking turns that into a JoinError.
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await?
            .map_err(|e| DocumentError::Extraction(format!("{e:?}")))?;

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(DocumentError::Empty);
        }

        info!(
            "Extracted {} characters from {}",
            text.chars().count(),
            document.file_name
        );
        Ok(text)
    }
}
