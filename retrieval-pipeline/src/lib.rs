pub mod answer;
pub mod cache;
pub mod engine;
pub mod index;

pub use answer::{Answer, MAX_SOURCE_LABELS, RETRIEVAL_TOP_K};
pub use cache::{DocumentIndexer, IndexCache, PdfIndexer};
pub use engine::{EngineCache, QaEngine};
pub use index::{ChunkRecord, VectorIndex};

/// A supporting chunk plus its similarity score, as returned by top-k
/// retrieval.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub text: String,
    pub page: u32,
    pub score: f32,
}
