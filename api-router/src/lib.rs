use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::post,
    Router,
};
use axum_session::{Session, SessionLayer, SessionNullPool, SessionStore};
use routes::{analyze::analyze_document, clear::clear_session, job_match::match_job_description, upload::upload_document};

pub mod api_state;
pub mod error;
mod routes;

pub type SessionType = Session<SessionNullPool>;
pub type SessionStoreType = SessionStore<SessionNullPool>;

/// Uploads are capped at 16 MiB.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Router for the JSON endpoints. Session state (one document path and an
/// initialized flag per client) lives behind the session layer.
pub fn api_routes<S>(session_store: SessionStoreType) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    Router::new()
        .route(
            "/upload",
            post(upload_document).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/analyze", post(analyze_document))
        .route("/job-match", post(match_job_description))
        .route("/clear", post(clear_session))
        .layer(SessionLayer::new(session_store))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, Response, StatusCode},
    };
    use axum_session::SessionConfig;
    use common::utils::{
        config::{AppConfig, EmbeddingBackend},
        embedding::EmbeddingProvider,
    };
    use retrieval_pipeline::engine::OpenAIClientType;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    async fn test_router() -> (Router, tempfile::TempDir) {
        let scratch = tempfile::tempdir().expect("temp dir");
        let config = AppConfig {
            data_dir: scratch.path().join("data").to_string_lossy().into_owned(),
            upload_dir: scratch
                .path()
                .join("uploads")
                .to_string_lossy()
                .into_owned(),
            embedding_backend: EmbeddingBackend::Hashed,
            ..AppConfig::default()
        };

        let state = ApiState::new(
            config,
            Arc::new(OpenAIClientType::new()),
            Arc::new(EmbeddingProvider::new_hashed(64).expect("hashed provider")),
        );
        let session_store = SessionStoreType::new(None, SessionConfig::default())
            .await
            .expect("session store");

        (api_routes(session_store).with_state(state), scratch)
    }

    fn session_cookies(response: &Response<Body>) -> String {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn json_request(uri: &str, cookies: &str, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if !cookies.is_empty() {
            builder = builder.header(header::COOKIE, cookies);
        }
        builder.body(Body::from(body.to_owned())).expect("request")
    }

    fn upload_request(filename: &str, cookies: &str) -> Request<Body> {
        let boundary = "AaB03x";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"resume\"; filename=\"{filename}\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             %PDF-1.4 minimal\r\n\
             --{boundary}--\r\n"
        );
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            );
        if !cookies.is_empty() {
            builder = builder.header(header::COOKIE, cookies);
        }
        builder.body(Body::from(body)).expect("request")
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn analyze_without_upload_is_rejected() {
        let (app, _scratch) = test_router().await;

        let response = app
            .oneshot(json_request("/analyze", "", r#"{"question":"skills?"}"#))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]
            .as_str()
            .expect("error field")
            .contains("upload"));
    }

    #[tokio::test]
    async fn job_match_without_upload_is_rejected() {
        let (app, _scratch) = test_router().await;

        let response = app
            .oneshot(json_request(
                "/job-match",
                "",
                r#"{"jobDescription":"Rust engineer"}"#,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_rejects_non_pdf_and_leaves_session_untouched() {
        let (app, _scratch) = test_router().await;

        let response = app
            .clone()
            .oneshot(upload_request("resume.txt", ""))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let cookies = session_cookies(&response);

        // The rejected upload must not have initialized the session.
        let response = app
            .oneshot(json_request(
                "/analyze",
                &cookies,
                r#"{"question":"skills?"}"#,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]
            .as_str()
            .expect("error field")
            .contains("upload"));
    }

    #[tokio::test]
    async fn upload_stores_file_and_initializes_session() {
        let (app, scratch) = test_router().await;

        let response = app
            .clone()
            .oneshot(upload_request("My Resume.PDF", ""))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let cookies = session_cookies(&response);
        let body = json_body(response).await;
        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["filename"], "My_Resume.PDF");
        assert!(scratch.path().join("uploads/My_Resume.PDF").exists());

        // Initialized session now fails on the question check instead.
        let response = app
            .oneshot(json_request("/analyze", &cookies, r#"{"question":"  "}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Question is required");
    }

    #[tokio::test]
    async fn clear_resets_the_session() {
        let (app, _scratch) = test_router().await;

        let response = app
            .clone()
            .oneshot(upload_request("resume.pdf", ""))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let cookies = session_cookies(&response);

        let response = app
            .clone()
            .oneshot(json_request("/clear", &cookies, "{}"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(json_request(
                "/analyze",
                &cookies,
                r#"{"question":"skills?"}"#,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]
            .as_str()
            .expect("error field")
            .contains("upload"));
    }
}
