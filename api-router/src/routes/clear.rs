use axum::{response::IntoResponse, Json};
use serde_json::json;

use crate::{error::ApiError, SessionType};

pub async fn clear_session(session: SessionType) -> Result<impl IntoResponse, ApiError> {
    session.clear();
    Ok(Json(json!({ "success": true })))
}
