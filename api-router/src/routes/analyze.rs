use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError, routes::require_document, SessionType};

#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    #[serde(default)]
    pub question: String,
}

pub async fn analyze_document(
    State(state): State<ApiState>,
    session: SessionType,
    Json(input): Json<AnalyzeParams>,
) -> Result<impl IntoResponse, ApiError> {
    let document_path = require_document(&session)?;

    if input.question.trim().is_empty() {
        return Err(ApiError::ValidationError("Question is required".into()));
    }

    info!(document = %document_path, "Analyzing resume");

    let engine = state.engine_for(&document_path).await?;
    let answer = engine.answer(&input.question).await?;

    Ok(Json(json!({
        "success": true,
        "answer": answer.content,
        "sources": answer.sources,
    })))
}
