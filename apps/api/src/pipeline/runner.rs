//! Pipeline Runner — executes a validated chain of tasks through a `TaskEngine`.
//!
//! Tasks run one at a time in declaration order. The first failure aborts the run;
//! files already written by earlier tasks stay on disk.

use std::collections::HashSet;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::pipeline::engine::{EngineError, TaskEngine};
use crate::pipeline::task::{TaskResult, TaskSpec};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("task id '{0}' is defined more than once")]
    DuplicateTask(String),

    #[error("task '{task}' depends on '{dependency}', which is not defined before it")]
    UnknownDependency { task: String, dependency: String },

    #[error("task '{task}' failed: {source}")]
    Engine {
        task: String,
        #[source]
        source: EngineError,
    },

    #[error("task '{task}' returned an empty response")]
    EmptyResponse { task: String },

    #[error("failed to write output of task '{task}' to {}: {source}", path.display())]
    Io {
        task: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Id of the task that failed, for run-time failures.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            PipelineError::Engine { task, .. }
            | PipelineError::EmptyResponse { task }
            | PipelineError::Io { task, .. } => Some(task),
            _ => None,
        }
    }
}

/// An ordered chain of tasks whose dependencies all point backwards.
#[derive(Debug)]
pub struct Pipeline {
    tasks: Vec<TaskSpec>,
}

impl Pipeline {
    /// Validates the wiring: ids are unique and every dependency names an earlier task.
    pub fn new(tasks: Vec<TaskSpec>) -> Result<Self, PipelineError> {
        let mut defined: HashSet<&str> = HashSet::new();
        for task in &tasks {
            for dependency in &task.dependencies {
                if !defined.contains(dependency.as_str()) {
                    return Err(PipelineError::UnknownDependency {
                        task: task.id.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
            if !defined.insert(task.id.as_str()) {
                return Err(PipelineError::DuplicateTask(task.id.clone()));
            }
        }
        Ok(Self { tasks })
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    /// Runs every task in order and returns their results in the same order.
    ///
    /// Each task receives the full results of its dependencies, in dependency order.
    /// A task with an `output_file` has its text written there before the next task starts.
    pub async fn run(&self, engine: &dyn TaskEngine) -> Result<Vec<TaskResult>, PipelineError> {
        let mut results: Vec<TaskResult> = Vec::with_capacity(self.tasks.len());

        for (step, task) in self.tasks.iter().enumerate() {
            info!(
                step = step + 1,
                total = self.tasks.len(),
                task = %task.id,
                agent = task.agent.role,
                "Running task"
            );

            // Validation in `new` guarantees every dependency is already in `results`.
            let context: Vec<&TaskResult> = task
                .dependencies
                .iter()
                .filter_map(|dep| results.iter().find(|r| &r.task_id == dep))
                .collect();

            let result = engine
                .execute(task, &context)
                .await
                .map_err(|source| PipelineError::Engine {
                    task: task.id.clone(),
                    source,
                })?;

            if result.text.trim().is_empty() {
                warn!(task = %task.id, "Engine returned an empty response");
                return Err(PipelineError::EmptyResponse {
                    task: task.id.clone(),
                });
            }

            if let Some(path) = &task.output_file {
                tokio::fs::write(path, &result.text)
                    .await
                    .map_err(|source| PipelineError::Io {
                        task: task.id.clone(),
                        path: path.clone(),
                        source,
                    })?;
                info!(task = %task.id, path = %path.display(), "Wrote task output");
            }

            results.push(result);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::pipeline::crew::roster;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn task(id: &str, deps: &[&str]) -> TaskSpec {
        TaskSpec {
            id: id.to_string(),
            agent: &roster().job_researcher,
            description: format!("do {id}"),
            expected_output: "text".to_string(),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            tools: vec![],
            output_file: None,
        }
    }

    /// Echoes the task id and records the context ids each task saw.
    #[derive(Default)]
    struct RecordingEngine {
        seen: Mutex<Vec<(String, Vec<String>)>>,
    }

    #[async_trait]
    impl TaskEngine for RecordingEngine {
        async fn execute(
            &self,
            task: &TaskSpec,
            context: &[&TaskResult],
        ) -> Result<TaskResult, EngineError> {
            let ids = context.iter().map(|r| r.task_id.clone()).collect();
            self.seen.lock().unwrap().push((task.id.clone(), ids));
            Ok(TaskResult::new(&task.id, format!("output of {}", task.id)))
        }
    }

    struct FailingEngine {
        fail_on: &'static str,
    }

    #[async_trait]
    impl TaskEngine for FailingEngine {
        async fn execute(
            &self,
            task: &TaskSpec,
            _context: &[&TaskResult],
        ) -> Result<TaskResult, EngineError> {
            if task.id == self.fail_on {
                return Err(LlmError::RateLimited { retries: 3 }.into());
            }
            Ok(TaskResult::new(&task.id, "ok"))
        }
    }

    struct BlankEngine;

    #[async_trait]
    impl TaskEngine for BlankEngine {
        async fn execute(
            &self,
            task: &TaskSpec,
            _context: &[&TaskResult],
        ) -> Result<TaskResult, EngineError> {
            Ok(TaskResult::new(&task.id, "  \n "))
        }
    }

    #[test]
    fn test_new_rejects_forward_dependency() {
        let err = Pipeline::new(vec![task("a", &["b"]), task("b", &[])]).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownDependency { ref task, .. } if task == "a"));
    }

    #[test]
    fn test_new_rejects_self_dependency() {
        let err = Pipeline::new(vec![task("a", &["a"])]).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownDependency { .. }));
    }

    #[test]
    fn test_new_rejects_duplicate_ids() {
        let err = Pipeline::new(vec![task("a", &[]), task("a", &[])]).unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateTask(ref id) if id == "a"));
    }

    #[tokio::test]
    async fn test_run_passes_dependencies_in_declared_order() {
        let pipeline = Pipeline::new(vec![
            task("a", &[]),
            task("b", &[]),
            task("c", &["b", "a"]),
        ])
        .unwrap();
        let engine = RecordingEngine::default();

        let results = pipeline.run(&engine).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[2].text, "output of c");
        let seen = engine.seen.lock().unwrap();
        assert_eq!(seen[2], ("c".to_string(), vec!["b".to_string(), "a".to_string()]));
    }

    #[tokio::test]
    async fn test_run_stops_at_first_failure() {
        let pipeline =
            Pipeline::new(vec![task("a", &[]), task("b", &["a"]), task("c", &["b"])]).unwrap();
        let err = pipeline
            .run(&FailingEngine { fail_on: "b" })
            .await
            .unwrap_err();

        assert_eq!(err.task_id(), Some("b"));
        assert!(err.to_string().contains("Rate limited"));
    }

    #[tokio::test]
    async fn test_run_rejects_blank_output() {
        let pipeline = Pipeline::new(vec![task("a", &[])]).unwrap();
        let err = pipeline.run(&BlankEngine).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyResponse { .. }));
        assert!(err.to_string().contains("empty response"));
    }

    #[tokio::test]
    async fn test_run_writes_output_files_as_tasks_finish() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = task("a", &[]);
        first.output_file = Some(dir.path().join("a.md"));
        let mut second = task("b", &["a"]);
        second.output_file = Some(dir.path().join("b.md"));
        let pipeline = Pipeline::new(vec![first, second]).unwrap();

        // "b" fails: "a.md" was already written and is not rolled back.
        let err = pipeline
            .run(&FailingEngine { fail_on: "b" })
            .await
            .unwrap_err();
        assert_eq!(err.task_id(), Some("b"));
        assert_eq!(std::fs::read_to_string(dir.path().join("a.md")).unwrap(), "ok");
        assert!(!dir.path().join("b.md").exists());
    }
}
