pub mod chunker;
pub mod pdf;

pub use chunker::{SemanticChunk, SemanticChunker};
pub use pdf::extract_pdf_pages;

/// One page of extracted document text, 1-based numbering.
#[derive(Debug, Clone)]
pub struct DocumentPage {
    pub number: u32,
    pub text: String,
}
