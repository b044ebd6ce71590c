//! Task Engine — the boundary between the pipeline and whatever generates text.
//!
//! Default: `LlmEngine` (Claude via `LlmClient`, with tool material gathered first).
//! Tests plug in fakes that return canned strings.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::llm_client::{LlmClient, LlmError};
use crate::pipeline::prompts::TASK_PROMPT_TEMPLATE;
use crate::pipeline::task::{format_context, TaskResult, TaskSpec};
use crate::tools::ToolKit;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Turns a task plus the outputs it depends on into generated text.
#[async_trait]
pub trait TaskEngine: Send + Sync {
    async fn execute(
        &self,
        task: &TaskSpec,
        context: &[&TaskResult],
    ) -> Result<TaskResult, EngineError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmEngine
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmEngine {
    llm: LlmClient,
    tools: ToolKit,
}

impl LlmEngine {
    pub fn new(llm: LlmClient, tools: ToolKit) -> Self {
        Self { llm, tools }
    }
}

#[async_trait]
impl TaskEngine for LlmEngine {
    async fn execute(
        &self,
        task: &TaskSpec,
        context: &[&TaskResult],
    ) -> Result<TaskResult, EngineError> {
        let material = self.tools.gather(&task.tools).await;
        let prompt = build_task_prompt(task, context, &material);
        debug!(
            task = %task.id,
            model = self.llm.model().id(),
            prompt_chars = prompt.len(),
            "Dispatching task to LLM"
        );

        let text = self.llm.call_text(&prompt, &task.agent.system_prompt).await?;
        Ok(TaskResult::new(&task.id, text))
    }
}

/// Fills the shared task template.
pub(crate) fn build_task_prompt(task: &TaskSpec, context: &[&TaskResult], material: &str) -> String {
    let context_text = if context.is_empty() {
        "None. This task starts from the inputs above.".to_string()
    } else {
        format_context(context)
    };
    let material = if material.trim().is_empty() {
        "None."
    } else {
        material
    };

    TASK_PROMPT_TEMPLATE
        .replace("{description}", &task.description)
        .replace("{expected_output}", &task.expected_output)
        .replace("{tool_material}", material)
        .replace("{context}", &context_text)
}

// ────────────────────────────────────────────────────────────────────────────
// Remediation hints
// ────────────────────────────────────────────────────────────────────────────

/// Picks a remediation hint for an engine failure by matching its message text.
pub fn remediation_hint(message: &str) -> Option<&'static str> {
    let lower = message.to_lowercase();
    if lower.contains("429") || lower.contains("rate limit") {
        Some(
            "The model provider is rate limiting requests. Wait a minute and retry, \
             or switch to a smaller, faster model such as claude-haiku-4-5.",
        )
    } else if lower.contains("empty response") {
        Some(
            "The model returned nothing. Retry the run, or switch to a different model.",
        )
    } else if lower.contains("timed out") || lower.contains("timeout") {
        Some("The model took too long to answer. Retry, or pick a faster model.")
    } else if lower.contains("status 401") || lower.contains("authentication") {
        Some("The LLM provider rejected the API key. Check ANTHROPIC_API_KEY.")
    } else {
        None
    }
}
