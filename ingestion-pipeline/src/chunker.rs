use std::sync::Arc;

use text_splitter::TextSplitter;
use tracing::debug;

use common::{
    error::AppError,
    utils::embedding::{cosine_similarity, EmbeddingProvider},
};

use crate::DocumentPage;

// Base segments are sentence-sized; adjacent ones merge while their
// embeddings stay above the similarity threshold.
const SEGMENT_MIN_CHARS: usize = 40;
const SEGMENT_MAX_CHARS: usize = 250;
const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.75;
const DEFAULT_MAX_CHUNK_CHARS: usize = 2_000;

/// A semantically coherent text span, the unit stored in the vector index.
/// Chunks never span page boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticChunk {
    pub text: String,
    pub page: u32,
}

pub struct SemanticChunker {
    embedder: Arc<EmbeddingProvider>,
    similarity_threshold: f32,
    max_chunk_chars: usize,
}

impl SemanticChunker {
    pub fn new(embedder: Arc<EmbeddingProvider>) -> Self {
        Self {
            embedder,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
        }
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub async fn chunk_pages(
        &self,
        pages: &[DocumentPage],
    ) -> Result<Vec<SemanticChunk>, AppError> {
        let mut chunks = Vec::new();
        for page in pages {
            chunks.extend(self.chunk_page(page).await?);
        }
        debug!(pages = pages.len(), chunks = chunks.len(), "Chunked document");
        Ok(chunks)
    }

    async fn chunk_page(&self, page: &DocumentPage) -> Result<Vec<SemanticChunk>, AppError> {
        let segments = split_segments(&page.text);
        if segments.is_empty() {
            return Ok(Vec::new());
        }
        if segments.len() == 1 {
            return Ok(segments
                .into_iter()
                .map(|text| SemanticChunk {
                    text,
                    page: page.number,
                })
                .collect());
        }

        let embeddings = self.embedder.embed_batch(segments.clone()).await?;

        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut previous_embedding: Option<&Vec<f32>> = None;

        for (segment, embedding) in segments.iter().zip(&embeddings) {
            let merge = previous_embedding.is_some_and(|previous| {
                cosine_similarity(previous, embedding) >= self.similarity_threshold
            }) && current.len() + segment.len() < self.max_chunk_chars;

            if current.is_empty() {
                current.clone_from(segment);
            } else if merge {
                current.push(' ');
                current.push_str(segment);
            } else {
                chunks.push(SemanticChunk {
                    text: std::mem::take(&mut current),
                    page: page.number,
                });
                current.clone_from(segment);
            }
            previous_embedding = Some(embedding);
        }

        if !current.is_empty() {
            chunks.push(SemanticChunk {
                text: current,
                page: page.number,
            });
        }

        Ok(chunks)
    }
}

fn split_segments(text: &str) -> Vec<String> {
    let splitter = TextSplitter::new(SEGMENT_MIN_CHARS..SEGMENT_MAX_CHARS);
    splitter.chunks(text).map(str::to_owned).collect()
}
