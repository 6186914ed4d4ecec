pub mod analyze;
pub mod clear;
pub mod job_match;
pub mod upload;

use crate::{error::ApiError, SessionType};

pub const SESSION_PDF_PATH_KEY: &str = "pdf_path";
pub const SESSION_INITIALIZED_KEY: &str = "qa_initialized";

/// The document path for an initialized session, or the upload-first error.
pub fn require_document(session: &SessionType) -> Result<String, ApiError> {
    let initialized = session
        .get::<bool>(SESSION_INITIALIZED_KEY)
        .unwrap_or(false);

    match session.get::<String>(SESSION_PDF_PATH_KEY) {
        Some(path) if initialized => Ok(path),
        _ => Err(ApiError::ValidationError(
            "Please upload a resume first".into(),
        )),
    }
}
