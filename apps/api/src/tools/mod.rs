//! Tools a task can use to gather material before the model is called.
//!
//! Tool failures never abort a run: a failed tool leaves a note in the prompt
//! so the model knows the material is missing.

use std::path::PathBuf;

use tracing::{info, warn};

pub mod resume;
pub mod web;

/// Upper bound on the characters any single tool contributes to a prompt.
pub const MAX_TOOL_CHARS: usize = 12_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tool {
    /// Fetch a page and reduce it to visible text.
    ScrapeWebsite { url: String },
    /// Web search; skipped when no search key is configured.
    WebSearch { query: String },
    /// Extract text from the uploaded resume.
    ReadResume { path: PathBuf },
}

impl Tool {
    fn label(&self) -> String {
        match self {
            Tool::ScrapeWebsite { url } => format!("Page content of {url}"),
            Tool::WebSearch { query } => format!("Search results for \"{query}\""),
            Tool::ReadResume { path } => format!("Text of resume {}", path.display()),
        }
    }
}

/// Runs tools on behalf of the LLM engine.
#[derive(Clone)]
pub struct ToolKit {
    http: reqwest::Client,
    search_api_key: Option<String>,
}

impl ToolKit {
    pub fn new(http: reqwest::Client, search_api_key: Option<String>) -> Self {
        Self {
            http,
            search_api_key,
        }
    }

    /// Runs every tool in order and joins their material into one prompt section.
    pub async fn gather(&self, tools: &[Tool]) -> String {
        let mut sections = Vec::with_capacity(tools.len());

        for tool in tools {
            let body = match self.run(tool).await {
                Ok(Some(text)) => {
                    info!(tool = %tool.label(), chars = text.len(), "Tool produced material");
                    truncate_chars(&text, MAX_TOOL_CHARS)
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!(tool = %tool.label(), "Tool failed: {e:#}");
                    format!("(unavailable: {e})")
                }
            };
            sections.push(format!("#### {}\n{}", tool.label(), body));
        }

        sections.join("\n\n")
    }

    /// `Ok(None)` means the tool is disabled for this run.
    async fn run(&self, tool: &Tool) -> anyhow::Result<Option<String>> {
        match tool {
            Tool::ScrapeWebsite { url } => web::scrape(&self.http, url).await.map(Some),
            Tool::WebSearch { query } => match &self.search_api_key {
                Some(key) => web::search(&self.http, key, query).await.map(Some),
                None => {
                    warn!("Skipping web search: no search key configured");
                    Ok(None)
                }
            },
            Tool::ReadResume { path } => resume::read_resume(path).await.map(Some),
        }
    }
}

/// Cuts `text` to at most `max` characters on a char boundary, marking the cut.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}\n[truncated]", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_text_untouched() {
        assert_eq!(truncate_chars("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        let text = "héllo wörld";
        let cut = truncate_chars(text, 4);
        assert_eq!(cut, "héll\n[truncated]");
    }

    #[tokio::test]
    async fn test_search_is_skipped_without_key() {
        let kit = ToolKit::new(reqwest::Client::new(), None);
        let material = kit
            .gather(&[Tool::WebSearch {
                query: "rust jobs".to_string(),
            }])
            .await;
        assert!(material.is_empty());
    }

    #[tokio::test]
    async fn test_failed_tool_leaves_a_note() {
        let dir = tempfile::tempdir().unwrap();
        let kit = ToolKit::new(reqwest::Client::new(), None);
        let material = kit
            .gather(&[Tool::ReadResume {
                path: dir.path().join("resume.pdf"),
            }])
            .await;
        assert!(material.contains("#### Text of resume"));
        assert!(material.contains("(unavailable:"));
    }

    #[tokio::test]
    async fn test_resume_material_is_labelled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.doc");
        std::fs::write(&path, b"binary").unwrap();
        let kit = ToolKit::new(reqwest::Client::new(), None);

        let material = kit.gather(&[Tool::ReadResume { path }]).await;
        assert!(material.starts_with("#### Text of resume"));
    }
}
