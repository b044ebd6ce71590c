//! Axum route handlers for uploads and downloads.

use std::path::Path;

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::artifacts::{save_resume, ResumeFormat};
use crate::errors::AppError;
use crate::pipeline::crew::{INTERVIEW_FILE, RESUME_FILE};
use crate::render::render_markdown_file;
use crate::state::AppState;

const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_name: String,
    pub bytes: usize,
}

/// POST /api/v1/resume
///
/// Multipart upload; the `file` field must be a pdf, docx, or doc.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        let format = ResumeFormat::from_path(Path::new(&original)).ok_or_else(|| {
            AppError::Validation(format!(
                "Unsupported resume file '{original}'. Upload a pdf, docx, or doc."
            ))
        })?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded resume is empty".to_string()));
        }

        save_resume(&state.config.work_dir, format, &bytes).await?;
        return Ok(Json(UploadResponse {
            file_name: format.file_name(),
            bytes: bytes.len(),
        }));
    }

    Err(AppError::Validation(
        "Multipart field 'file' is required".to_string(),
    ))
}

/// GET /api/v1/artifacts/resume.md
pub async fn handle_download_resume_markdown(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    markdown_download(&state.config.work_dir, RESUME_FILE).await
}

/// GET /api/v1/artifacts/interview.md
pub async fn handle_download_interview_markdown(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    markdown_download(&state.config.work_dir, INTERVIEW_FILE).await
}

/// GET /api/v1/artifacts/resume.pdf
///
/// Renders the current resume markdown on every request.
pub async fn handle_download_resume_pdf(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let path = state.config.work_dir.join(RESUME_FILE);
    if !path.is_file() {
        return Err(AppError::NotFound(
            "No tailored resume yet. Run the pipeline first.".to_string(),
        ));
    }

    let outcome = tokio::task::spawn_blocking(move || render_markdown_file(&path))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF render task failed: {e}")))??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"tailored_resume.pdf\"",
            ),
        ],
        outcome.pdf,
    ))
}

async fn markdown_download(
    work_dir: &Path,
    file_name: &'static str,
) -> Result<impl IntoResponse, AppError> {
    let path = work_dir.join(file_name);
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!(
                "{file_name} has not been generated yet. Run the pipeline first."
            )))
        }
        Err(e) => {
            return Err(AppError::Internal(
                anyhow::Error::new(e).context(format!("Failed to read {}", path.display())),
            ))
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, MARKDOWN_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        content,
    ))
}
