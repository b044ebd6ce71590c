// Tailoring pipeline: job analysis → candidate profile → resume → interview prep.
// All model calls go through the TaskEngine boundary, never the HTTP client directly.

use std::path::PathBuf;

use crate::llm_client::ModelChoice;

pub mod crew;
pub mod engine;
pub mod handlers;
pub mod prompts;
pub mod runner;
pub mod service;
pub mod task;

/// Validated form inputs for one run.
#[derive(Debug, Clone)]
pub struct TailorInputs {
    pub job_url: String,
    pub github_url: String,
    pub summary: String,
    /// A previously uploaded resume.
    pub resume_path: PathBuf,
    pub model: ModelChoice,
}
