use axum::{extract::State, response::IntoResponse, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use serde_json::json;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

use common::utils::files::{persist_upload, sanitize_file_name};

use crate::{
    api_state::ApiState,
    error::ApiError,
    routes::{SESSION_INITIALIZED_KEY, SESSION_PDF_PATH_KEY},
    SessionType,
};

#[derive(Debug, TryFromMultipart)]
pub struct UploadParams {
    #[form_data(limit = "16MiB")]
    pub resume: FieldData<NamedTempFile>,
}

pub async fn upload_document(
    State(state): State<ApiState>,
    session: SessionType,
    TypedMultipart(input): TypedMultipart<UploadParams>,
) -> Result<impl IntoResponse, ApiError> {
    let file_name = input.resume.metadata.file_name.clone().unwrap_or_default();
    if file_name.is_empty() {
        return Err(ApiError::ValidationError("No selected file".into()));
    }
    if !file_name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(ApiError::ValidationError(
            "Invalid file format. Please upload a PDF.".into(),
        ));
    }

    let sanitized = sanitize_file_name(&file_name);
    let stored_path = persist_upload(
        input.resume.contents.path(),
        Path::new(&state.config.upload_dir),
        &sanitized,
    )
    .await?;

    session.set(
        SESSION_PDF_PATH_KEY,
        stored_path.to_string_lossy().into_owned(),
    );
    session.set(SESSION_INITIALIZED_KEY, true);

    info!(filename = %sanitized, "Stored uploaded resume");

    Ok(Json(json!({
        "success": true,
        "message": "Resume uploaded successfully",
        "filename": sanitized,
    })))
}
