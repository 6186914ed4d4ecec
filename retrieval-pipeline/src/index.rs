use std::{cmp::Ordering, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{error::AppError, utils::embedding::cosine_similarity};

use crate::RetrievedChunk;

/// One indexed chunk: its text, originating page and embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub text: String,
    pub page: u32,
    pub embedding: Vec<f32>,
}

/// In-memory nearest-neighbour index over chunk embeddings. Serialized
/// wholesale into the on-disk cache; the format is internal and carries no
/// cross-version guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    chunks: Vec<ChunkRecord>,
}

impl VectorIndex {
    pub fn from_records(dimension: usize, chunks: Vec<ChunkRecord>) -> Self {
        Self { dimension, chunks }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Exhaustive cosine-similarity search, best first. Rejects query vectors
    /// whose dimension differs from the indexed embeddings (e.g. a cache file
    /// built under another embedding backend).
    pub fn top_k(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>, AppError> {
        if query.len() != self.dimension {
            return Err(AppError::Processing(format!(
                "query embedding dimension {} does not match indexed dimension {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<RetrievedChunk> = self
            .chunks
            .iter()
            .map(|record| RetrievedChunk {
                text: record.text.clone(),
                page: record.page,
                score: cosine_similarity(&record.embedding, query),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    /// Persists the index as JSON via a sibling temp file and an atomic
    /// rename, so readers never observe a truncated cache entry.
    pub async fn save(&self, path: &Path) -> Result<(), AppError> {
        let parent = path.parent().ok_or_else(|| {
            AppError::Processing("index cache path has no parent directory".into())
        })?;
        tokio::fs::create_dir_all(parent).await?;

        let bytes = serde_json::to_vec(self)?;
        let staging = path.with_extension("tmp");
        tokio::fs::write(&staging, &bytes).await?;
        tokio::fs::rename(&staging, path).await?;

        debug!(path = %path.display(), chunks = self.chunks.len(), "Saved vector index");
        Ok(())
    }

    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
