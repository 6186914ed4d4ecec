use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppError;

/// Reduces an untrusted upload filename to a flat, shell-safe name.
/// Path separators and parent components are stripped, whitespace becomes
/// underscores, and anything outside `[A-Za-z0-9._-]` is dropped.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let mut sanitized: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    while sanitized.starts_with('.') {
        sanitized.remove(0);
    }

    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}

/// Copies an uploaded temp file into the uploads directory under the given
/// (already sanitized) name, creating the directory on first use. An upload
/// with a name seen before replaces the previous file.
pub async fn persist_upload(
    source: &Path,
    upload_dir: &Path,
    file_name: &str,
) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(upload_dir).await?;
    let destination = upload_dir.join(file_name);
    tokio::fs::copy(source, &destination).await?;
    debug!(path = %destination.display(), "Persisted uploaded file");
    Ok(destination)
}
