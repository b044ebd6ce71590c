//! Task definitions for the tailoring pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pipeline::crew::AgentProfile;
use crate::tools::Tool;

/// One unit of delegated text generation.
///
/// `dependencies` lists earlier task ids, in the order their outputs are handed to this task.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub id: String,
    pub agent: &'static AgentProfile,
    pub description: String,
    /// Free-text contract describing what the reply must contain.
    pub expected_output: String,
    pub dependencies: Vec<String>,
    /// Material gathered before the model is called.
    pub tools: Vec<Tool>,
    /// Where the result is written as soon as the task completes.
    pub output_file: Option<PathBuf>,
}

/// The raw text a task produced. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    pub text: String,
}

impl TaskResult {
    pub fn new(task_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            text: text.into(),
        }
    }
}

/// Formats dependency outputs into the context block handed to a task.
///
/// Each output appears in full, in the given order, under a header naming its task.
pub fn format_context(context: &[&TaskResult]) -> String {
    context
        .iter()
        .map(|r| format!("### Output of `{}`\n\n{}\n", r.task_id, r.text.trim_end()))
        .collect::<Vec<_>>()
        .join("\n")
}
