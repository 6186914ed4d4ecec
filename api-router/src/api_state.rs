use std::{path::Path, sync::Arc};

use common::{error::AppError, utils::config::AppConfig, utils::embedding::EmbeddingProvider};
use retrieval_pipeline::{
    engine::OpenAIClientType, EngineCache, IndexCache, PdfIndexer, QaEngine,
};

#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub chat_client: Arc<OpenAIClientType>,
    pub embedding_provider: Arc<EmbeddingProvider>,
    pub index_cache: Arc<IndexCache>,
    pub engines: EngineCache,
}

impl ApiState {
    pub fn new(
        config: AppConfig,
        chat_client: Arc<OpenAIClientType>,
        embedding_provider: Arc<EmbeddingProvider>,
    ) -> Self {
        let index_cache = Arc::new(IndexCache::new(config.data_dir.clone()));
        Self {
            config,
            chat_client,
            embedding_provider,
            index_cache,
            engines: EngineCache::new(),
        }
    }

    /// The cached engine for a document path. The first request per path runs
    /// the full cache-or-build index lifecycle; later ones hit the in-process
    /// map.
    pub async fn engine_for(&self, document_path: &str) -> Result<Arc<QaEngine>, AppError> {
        self.engines
            .get_or_build(document_path, || async {
                let indexer = PdfIndexer::new(self.embedding_provider.clone());
                let index = self
                    .index_cache
                    .load_or_build(Path::new(document_path), &indexer)
                    .await?;
                Ok(QaEngine::new(
                    index,
                    self.embedding_provider.clone(),
                    self.chat_client.clone(),
                    self.config.chat_model.clone(),
                ))
            })
            .await
    }
}
