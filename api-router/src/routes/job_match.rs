use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use retrieval_pipeline::answer::job_match_question;

use crate::{api_state::ApiState, error::ApiError, routes::require_document, SessionType};

#[derive(Debug, Deserialize)]
pub struct JobMatchParams {
    #[serde(rename = "jobDescription", default)]
    pub job_description: String,
}

pub async fn match_job_description(
    State(state): State<ApiState>,
    session: SessionType,
    Json(input): Json<JobMatchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let document_path = require_document(&session)?;

    if input.job_description.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "Job description is required".into(),
        ));
    }

    info!(document = %document_path, "Scoring resume against job description");

    let engine = state.engine_for(&document_path).await?;
    let answer = engine
        .answer(&job_match_question(&input.job_description))
        .await?;

    Ok(Json(json!({
        "success": true,
        "match_analysis": answer.content,
    })))
}
