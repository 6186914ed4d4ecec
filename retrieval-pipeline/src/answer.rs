use async_openai::{
    error::OpenAIError,
    types::{
        ChatCompletionRequestUserMessage, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};

use common::error::AppError;

use crate::RetrievedChunk;

/// Chunks retrieved per question.
pub const RETRIEVAL_TOP_K: usize = 3;
/// Retrieved chunks considered for source attribution.
pub const MAX_SOURCE_LABELS: usize = 2;

/// A first-pass answer together with its de-duplicated source labels.
#[derive(Debug, Clone)]
pub struct Answer {
    pub content: String,
    pub sources: Vec<String>,
}

pub fn render_answer_prompt(context: &str, question: &str) -> String {
    format!(
        r#"Use the following context to answer the question.
If you don't know the answer, just say "I don't know" - don't make up an answer.
Keep your response concise (3-4 sentences).

Context: {context}
Question: {question}

Helpful Answer:"#
    )
}

/// The second, streamed pass re-asks the question with the first-pass answer
/// folded in as context.
pub fn render_elaboration_prompt(question: &str, first_pass_answer: &str) -> String {
    format!("{question} Context: {first_pass_answer}")
}

pub fn job_match_question(job_description: &str) -> String {
    format!(
        "Based on the following job description, evaluate how well the candidate's \
         skills and experience match. Provide a match percentage and brief explanation. \
         Job description: {job_description}"
    )
}

pub fn create_chat_request(
    model: &str,
    prompt: String,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages([ChatCompletionRequestUserMessage::from(prompt).into()])
        .build()
}

pub fn process_chat_response(
    response: CreateChatCompletionResponse,
) -> Result<String, AppError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(AppError::LLMParsing(
            "No content found in LLM response".into(),
        ))
}

/// Maps the first retrieved chunks to display labels, de-duplicated, in
/// retrieval order.
pub fn source_labels(chunks: &[RetrievedChunk]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for chunk in chunks.iter().take(MAX_SOURCE_LABELS) {
        let label = format!("Page {}", chunk.page);
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}
