//! Tailoring service — validates a run request, builds the engine, runs the crew,
//! and checks that the resulting resume renders.
//!
//! Flow: credential check → input validation → build tasks → run pipeline →
//!       resume + interview markdown on disk → PDF render probe.
//!
//! Output files are overwritten on every run. Two runs sharing a working directory
//! race on them (last writer wins); the service assumes a single user.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::artifacts::find_resume;
use crate::config::LLM_API_KEY;
use crate::errors::AppError;
use crate::llm_client::{LlmClient, ModelChoice};
use crate::pipeline::crew::{build_tasks, INTERVIEW_PREP, RESUME_FILE, RESUME_WRITING};
use crate::pipeline::engine::{LlmEngine, TaskEngine};
use crate::pipeline::runner::{Pipeline, PipelineError};
use crate::pipeline::task::TaskResult;
use crate::pipeline::TailorInputs;
use crate::render::render_markdown_file;
use crate::state::AppState;
use crate::tools::ToolKit;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Request body for a pipeline run. Missing fields deserialize as empty and are
/// rejected by validation with a readable message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunRequest {
    pub job_url: String,
    pub github_url: String,
    pub summary: String,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub run_id: Uuid,
    pub model: ModelChoice,
    pub resume_markdown: String,
    pub interview_markdown: String,
    /// Raw text of the last task.
    pub final_output: String,
    /// Every task's output, in execution order.
    pub task_outputs: Vec<TaskResult>,
    pub pdf_available: bool,
    pub pdf_error: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Everything one successful run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub results: Vec<TaskResult>,
    pub resume_markdown: String,
    pub interview_markdown: String,
    pub final_output: String,
}

impl RunRequest {
    /// Checks every required field and resolves the uploaded resume.
    pub fn into_inputs(self, work_dir: &Path) -> Result<TailorInputs, AppError> {
        let job_url = require_field("job_url", self.job_url)?;
        let github_url = require_field("github_url", self.github_url)?;
        let summary = require_field("summary", self.summary)?;

        let model = match self.model.as_deref().map(str::trim) {
            None | Some("") => ModelChoice::default(),
            Some(id) => id.parse().map_err(AppError::Validation)?,
        };

        let resume_path = find_resume(work_dir).ok_or_else(|| {
            AppError::Validation(
                "No resume uploaded. Upload a pdf, docx, or doc file before running.".to_string(),
            )
        })?;

        Ok(TailorInputs {
            job_url,
            github_url,
            summary,
            resume_path,
            model,
        })
    }
}

fn require_field(name: &str, value: String) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{name} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

/// Handles one run end to end against the production LLM engine.
pub async fn run_tailoring(state: &AppState, request: RunRequest) -> Result<RunResponse, AppError> {
    // Credentials first: nothing is validated, fetched, or written without them.
    let api_key = state.config.secrets.llm_api_key.clone().ok_or_else(|| {
        AppError::Configuration(format!(
            "{LLM_API_KEY} is not set. Add it to the secrets file or the environment \
             before running the pipeline."
        ))
    })?;

    let work_dir = state.config.work_dir.as_path();
    let inputs = request.into_inputs(work_dir)?;

    let search_key = state.config.secrets.search_api_key.clone();
    if search_key.is_none() {
        warn!("Search key not configured; web search is disabled for this run");
    }

    let llm = LlmClient::new(api_key, inputs.model)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build LLM client: {e}")))?;
    let engine = LlmEngine::new(llm, ToolKit::new(state.http.clone(), search_key));

    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("pipeline_run", %run_id, model = inputs.model.id());
    let output = tailor(&inputs, &engine, work_dir).instrument(span).await?;

    let (pdf_available, pdf_error) = probe_pdf(work_dir).await;

    Ok(RunResponse {
        run_id,
        model: inputs.model,
        resume_markdown: output.resume_markdown,
        interview_markdown: output.interview_markdown,
        final_output: output.final_output,
        task_outputs: output.results,
        pdf_available,
        pdf_error,
        generated_at: Utc::now(),
    })
}

/// Builds the four-task chain for `inputs` and runs it on `engine`.
pub async fn tailor(
    inputs: &TailorInputs,
    engine: &dyn TaskEngine,
    work_dir: &Path,
) -> Result<PipelineOutput, PipelineError> {
    let pipeline = Pipeline::new(build_tasks(inputs, work_dir))?;
    info!("Starting pipeline with {} tasks", pipeline.tasks().len());

    let results = pipeline.run(engine).await.inspect_err(|e| {
        warn!(
            task = e.task_id().unwrap_or("-"),
            "Pipeline aborted; earlier outputs stay on disk: {e}"
        )
    })?;

    let text_of = |id: &str| {
        results
            .iter()
            .find(|r| r.task_id == id)
            .map(|r| r.text.clone())
            .unwrap_or_default()
    };
    let resume_markdown = text_of(RESUME_WRITING);
    let interview_markdown = text_of(INTERVIEW_PREP);
    let final_output = results.last().map(|r| r.text.clone()).unwrap_or_default();

    info!(
        resume_chars = resume_markdown.len(),
        interview_chars = interview_markdown.len(),
        "Pipeline finished"
    );

    Ok(PipelineOutput {
        results,
        resume_markdown,
        interview_markdown,
        final_output,
    })
}

/// Renders the fresh resume once so the caller knows whether a PDF can be offered.
async fn probe_pdf(work_dir: &Path) -> (bool, Option<String>) {
    let path = work_dir.join(RESUME_FILE);
    let rendered = tokio::task::spawn_blocking(move || render_markdown_file(&path)).await;

    match rendered {
        Ok(Ok(outcome)) => {
            info!(
                engine = outcome.engine,
                used_fallback = outcome.used_fallback,
                bytes = outcome.pdf.len(),
                "Resume PDF renders"
            );
            (true, None)
        }
        Ok(Err(e)) => {
            warn!("Resume PDF unavailable: {e}");
            (false, Some(e.to_string()))
        }
        Err(e) => {
            warn!("PDF render task panicked: {e}");
            (false, Some("PDF rendering crashed".to_string()))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
