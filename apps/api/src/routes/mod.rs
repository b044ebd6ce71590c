pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::artifacts::handlers as artifacts;
use crate::pipeline::handlers as pipeline;
use crate::state::AppState;

/// Largest accepted resume upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Inputs
        .route(
            "/api/v1/resume",
            post(artifacts::handle_upload_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/models", get(pipeline::handle_list_models))
        // Pipeline
        .route("/api/v1/pipeline/run", post(pipeline::handle_run))
        // Artifacts
        .route(
            "/api/v1/artifacts/resume.md",
            get(artifacts::handle_download_resume_markdown),
        )
        .route(
            "/api/v1/artifacts/interview.md",
            get(artifacts::handle_download_interview_markdown),
        )
        .route(
            "/api/v1/artifacts/resume.pdf",
            get(artifacts::handle_download_resume_pdf),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::config::{Config, Secrets};

    fn state_in(dir: &std::path::Path) -> AppState {
        AppState {
            config: Config {
                port: 0,
                rust_log: "info".to_string(),
                work_dir: dir.to_path_buf(),
                secrets: Secrets::default(),
            },
            http: reqwest::Client::new(),
        }
    }

    async fn get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let response = get(build_router(state_in(dir.path())), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_artifacts_missing_before_first_run() {
        let dir = tempfile::tempdir().unwrap();
        for uri in [
            "/api/v1/artifacts/resume.md",
            "/api/v1/artifacts/interview.md",
            "/api/v1/artifacts/resume.pdf",
        ] {
            let response = get(build_router(state_in(dir.path())), uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_markdown_download_serves_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tailored_resume.md"), "# Jane Doe\n").unwrap();

        let response = get(build_router(state_in(dir.path())), "/api/v1/artifacts/resume.md").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/markdown"));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"# Jane Doe\n");
    }

    #[tokio::test]
    async fn test_pdf_download_renders_current_markdown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tailored_resume.md"),
            "# Jane Doe\n## Skills\n- Rust",
        )
        .unwrap();

        let response = get(build_router(state_in(dir.path())), "/api/v1/artifacts/resume.pdf").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_upload_stores_resume() {
        let dir = tempfile::tempdir().unwrap();
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"My CV.PDF\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             %PDF-1.4 fake\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resume")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = build_router(state_in(dir.path()))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(dir.path().join("resume.pdf").is_file());
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cv.txt\"\r\n\r\n\
             hello\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resume")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = build_router(state_in(dir.path()))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
