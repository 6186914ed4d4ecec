use std::path::Path;

use tracing::debug;

use common::error::AppError;

use crate::DocumentPage;

/// Extracts the text layer of a PDF page by page, keeping the work off the
/// async executor. Pages without extractable text are skipped; a document
/// with no text at all is a processing error.
pub async fn extract_pdf_pages(file_path: &Path) -> Result<Vec<DocumentPage>, AppError> {
    let pdf_bytes = tokio::fs::read(file_path).await?;

    let raw_pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&pdf_bytes)
            .map_err(|err| AppError::Processing(format!("Failed to extract text from PDF: {err}")))
    })
    .await??;

    let pages: Vec<DocumentPage> = raw_pages
        .into_iter()
        .enumerate()
        .filter_map(|(idx, text)| {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(DocumentPage {
                number: idx as u32 + 1,
                text: trimmed.to_owned(),
            })
        })
        .collect();

    if pages.is_empty() {
        return Err(AppError::Processing(
            "PDF contains no extractable text".into(),
        ));
    }

    debug!(pages = pages.len(), "Extracted PDF text layer");
    Ok(pages)
}
