use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use tracing::{debug, info};

use common::{error::AppError, utils::embedding::EmbeddingProvider};
use ingestion_pipeline::{extract_pdf_pages, SemanticChunker};

use crate::index::{ChunkRecord, VectorIndex};

/// Builds a vector index from a document on disk. A trait seam so the cache
/// lifecycle can be exercised with instrumented fakes.
#[async_trait]
pub trait DocumentIndexer: Send + Sync {
    async fn build_index(&self, document_path: &Path) -> Result<VectorIndex, AppError>;
}

/// Production indexer: extract pages, chunk them semantically, embed every
/// chunk and assemble the index.
pub struct PdfIndexer {
    embedder: Arc<EmbeddingProvider>,
    chunker: SemanticChunker,
}

impl PdfIndexer {
    pub fn new(embedder: Arc<EmbeddingProvider>) -> Self {
        let chunker = SemanticChunker::new(embedder.clone());
        Self { embedder, chunker }
    }
}

#[async_trait]
impl DocumentIndexer for PdfIndexer {
    async fn build_index(&self, document_path: &Path) -> Result<VectorIndex, AppError> {
        let pages = extract_pdf_pages(document_path).await?;
        let chunks = self.chunker.chunk_pages(&pages).await?;
        if chunks.is_empty() {
            return Err(AppError::Processing(
                "document produced no indexable chunks".into(),
            ));
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(texts).await?;

        let records = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| ChunkRecord {
                text: chunk.text,
                page: chunk.page,
                embedding,
            })
            .collect();

        Ok(VectorIndex::from_records(self.embedder.dimension(), records))
    }
}

/// On-disk index cache keyed by document file name only. A document replaced
/// under the same name keeps serving the old entry; entries are never
/// deleted. Both behaviors are pinned by tests.
pub struct IndexCache {
    cache_dir: PathBuf,
}

impl IndexCache {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: data_dir.into().join("indexes"),
        }
    }

    pub fn cache_path_for(&self, document_path: &Path) -> PathBuf {
        let base = document_path
            .file_name()
            .map_or_else(|| "document".to_owned(), |name| name.to_string_lossy().into_owned());
        self.cache_dir.join(format!("{base}.index.json"))
    }

    /// Returns a ready-to-query index: deserialized from the cache when an
    /// entry with this name exists, otherwise built, persisted and returned.
    /// A failed build persists nothing.
    pub async fn load_or_build(
        &self,
        document_path: &Path,
        indexer: &dyn DocumentIndexer,
    ) -> Result<VectorIndex, AppError> {
        let cache_path = self.cache_path_for(document_path);

        if tokio::fs::try_exists(&cache_path).await? {
            debug!(path = %cache_path.display(), "Loading cached vector index");
            return VectorIndex::load(&cache_path).await;
        }

        info!(document = %document_path.display(), "No cached index, building");
        let index = indexer.build_index(document_path).await?;
        index.save(&cache_path).await?;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingIndexer {
        builds: AtomicUsize,
        fail: bool,
    }

    impl CountingIndexer {
        fn new() -> Self {
            Self {
                builds: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                builds: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn build_count(&self) -> usize {
            self.builds.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentIndexer for CountingIndexer {
        async fn build_index(&self, _document_path: &Path) -> Result<VectorIndex, AppError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Processing("boom".into()));
            }
            Ok(VectorIndex::from_records(
                2,
                vec![ChunkRecord {
                    text: "chunk".into(),
                    page: 1,
                    embedding: vec![1.0, 0.0],
                }],
            ))
        }
    }

    #[tokio::test]
    async fn first_call_builds_and_persists() {
        let scratch = tempfile::tempdir().unwrap();
        let cache = IndexCache::new(scratch.path());
        let indexer = CountingIndexer::new();
        let document = scratch.path().join("resume.pdf");

        let index = cache.load_or_build(&document, &indexer).await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(indexer.build_count(), 1);
        assert!(cache.cache_path_for(&document).exists());
    }

    #[tokio::test]
    async fn second_call_skips_the_pipeline() {
        let scratch = tempfile::tempdir().unwrap();
        let cache = IndexCache::new(scratch.path());
        let indexer = CountingIndexer::new();
        let document = scratch.path().join("resume.pdf");

        cache.load_or_build(&document, &indexer).await.unwrap();
        cache.load_or_build(&document, &indexer).await.unwrap();
        assert_eq!(indexer.build_count(), 1);
    }

    // Documents the name-only cache key: replacing the file content behind a
    // name still serves the stale entry.
    #[tokio::test]
    async fn cache_key_ignores_document_content() {
        let scratch = tempfile::tempdir().unwrap();
        let cache = IndexCache::new(scratch.path());
        let indexer = CountingIndexer::new();

        let first_location = scratch.path().join("a/resume.pdf");
        let second_location = scratch.path().join("b/resume.pdf");

        cache.load_or_build(&first_location, &indexer).await.unwrap();
        let reloaded = cache
            .load_or_build(&second_location, &indexer)
            .await
            .unwrap();

        assert_eq!(indexer.build_count(), 1);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(
            cache.cache_path_for(&first_location),
            cache.cache_path_for(&second_location)
        );
    }

    #[tokio::test]
    async fn failed_build_caches_nothing() {
        let scratch = tempfile::tempdir().unwrap();
        let cache = IndexCache::new(scratch.path());
        let failing = CountingIndexer::failing();
        let document = scratch.path().join("resume.pdf");

        let result = cache.load_or_build(&document, &failing).await;
        assert!(result.is_err());
        assert!(!cache.cache_path_for(&document).exists());

        // A later attempt runs the pipeline again instead of loading junk.
        let indexer = CountingIndexer::new();
        cache.load_or_build(&document, &indexer).await.unwrap();
        assert_eq!(indexer.build_count(), 1);
    }
}
