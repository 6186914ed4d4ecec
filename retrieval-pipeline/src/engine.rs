use std::{collections::HashMap, future::Future, sync::Arc};

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

use common::{error::AppError, utils::embedding::EmbeddingProvider};

use crate::{
    answer::{
        create_chat_request, process_chat_response, render_answer_prompt,
        render_elaboration_prompt, source_labels, Answer, RETRIEVAL_TOP_K,
    },
    index::VectorIndex,
    RetrievedChunk,
};

pub type OpenAIClientType = async_openai::Client<async_openai::config::OpenAIConfig>;

/// Answers questions over one indexed document: top-k retrieval, a prompted
/// first pass, and an optional streamed elaboration pass.
pub struct QaEngine {
    index: VectorIndex,
    embedder: Arc<EmbeddingProvider>,
    chat_client: Arc<OpenAIClientType>,
    chat_model: String,
}

impl QaEngine {
    pub fn new(
        index: VectorIndex,
        embedder: Arc<EmbeddingProvider>,
        chat_client: Arc<OpenAIClientType>,
        chat_model: String,
    ) -> Self {
        Self {
            index,
            embedder,
            chat_client,
            chat_model,
        }
    }

    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedChunk>, AppError> {
        let query = self.embedder.embed(question).await?;
        self.index.top_k(&query, RETRIEVAL_TOP_K)
    }

    /// First-pass answer: retrieved context stuffed into the fixed prompt,
    /// one synchronous completion, plus source labels.
    #[instrument(skip_all)]
    pub async fn answer(&self, question: &str) -> Result<Answer, AppError> {
        let retrieved = self.retrieve(question).await?;
        debug!(chunks = retrieved.len(), "Retrieved context for question");

        let context = retrieved
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let request =
            create_chat_request(&self.chat_model, render_answer_prompt(&context, question))?;
        let response = self.chat_client.chat().create(request).await?;
        let content = process_chat_response(response)?;

        Ok(Answer {
            content,
            sources: source_labels(&retrieved),
        })
    }

    /// Second pass, token by token. The consumer may drop the stream at any
    /// point to stop generation without involving the producer.
    pub async fn elaborate_stream(
        &self,
        question: &str,
        first_pass_answer: &str,
    ) -> Result<impl Stream<Item = Result<String, AppError>>, AppError> {
        let request = create_chat_request(
            &self.chat_model,
            render_elaboration_prompt(question, first_pass_answer),
        )?;
        let mut upstream = self.chat_client.chat().create_stream(request).await?;

        Ok(try_stream! {
            while let Some(item) = upstream.next().await {
                let response = item?;
                let token = response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content);
                if let Some(token) = token {
                    if !token.is_empty() {
                        yield token;
                    }
                }
            }
        })
    }
}

/// Process-wide map from document path to its constructed engine. Unbounded
/// and never evicted; a per-key build lock keeps concurrent first requests
/// from racing the pipeline.
#[derive(Clone, Default)]
pub struct EngineCache {
    engines: Arc<RwLock<HashMap<String, Arc<QaEngine>>>>,
    build_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl EngineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_build<F, Fut>(&self, key: &str, build: F) -> Result<Arc<QaEngine>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<QaEngine, AppError>>,
    {
        if let Some(engine) = self.engines.read().await.get(key) {
            return Ok(engine.clone());
        }

        let build_lock = {
            let mut locks = self.build_locks.lock().await;
            locks
                .entry(key.to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _guard = build_lock.lock().await;

        // Another request may have finished the build while we waited.
        if let Some(engine) = self.engines.read().await.get(key) {
            return Ok(engine.clone());
        }

        let engine = Arc::new(build().await?);
        self.engines
            .write()
            .await
            .insert(key.to_owned(), engine.clone());
        debug!(key, "Cached QA engine");
        Ok(engine)
    }
}
