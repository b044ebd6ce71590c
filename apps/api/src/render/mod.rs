//! Markdown to PDF rendering for the tailored resume.
//!
//! The styled A4 layout is tried first; if it errors or panics the same blocks
//! go through the plain US Letter layout. Both keep every line of content.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

pub mod font_metrics;
pub mod layout;
pub mod markdown;
pub mod pdf;

use layout::{BasicLayout, LayoutEngine, StyledLayout};
use markdown::{parse_markdown, RenderedDocument};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot read {}: {source}", .path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{engine} layout failed: {message}")]
    Layout {
        engine: &'static str,
        message: String,
    },

    #[error("PDF encoding failed: {0}")]
    Encode(String),

    #[error("both layouts failed ({primary}; fallback: {fallback})")]
    Exhausted { primary: String, fallback: String },
}

#[derive(Debug)]
pub struct RenderOutcome {
    pub pdf: Vec<u8>,
    pub engine: &'static str,
    pub used_fallback: bool,
}

/// Reads `path` and renders it with the default engines.
pub fn render_markdown_file(path: &Path) -> Result<RenderOutcome, RenderError> {
    let source = std::fs::read_to_string(path).map_err(|source| RenderError::Source {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = parse_markdown(&source);
    render_document(&doc, &StyledLayout::default(), &BasicLayout::default())
}

pub fn render_document(
    doc: &RenderedDocument,
    primary: &dyn LayoutEngine,
    fallback: &dyn LayoutEngine,
) -> Result<RenderOutcome, RenderError> {
    let primary_error = match guarded_render(primary, doc) {
        Ok(pdf) => {
            info!(engine = primary.name(), bytes = pdf.len(), "Rendered PDF");
            return Ok(RenderOutcome {
                pdf,
                engine: primary.name(),
                used_fallback: false,
            });
        }
        Err(e) => e,
    };

    warn!(
        engine = primary.name(),
        "Primary layout failed, using {}: {primary_error}",
        fallback.name()
    );

    match guarded_render(fallback, doc) {
        Ok(pdf) => {
            info!(engine = fallback.name(), bytes = pdf.len(), "Rendered PDF");
            Ok(RenderOutcome {
                pdf,
                engine: fallback.name(),
                used_fallback: true,
            })
        }
        Err(fallback_error) => Err(RenderError::Exhausted {
            primary: primary_error,
            fallback: fallback_error,
        }),
    }
}

/// Runs one engine, turning both errors and panics into a message.
fn guarded_render(engine: &dyn LayoutEngine, doc: &RenderedDocument) -> Result<Vec<u8>, String> {
    match catch_unwind(AssertUnwindSafe(|| engine.render(doc))) {
        Ok(Ok(pdf)) => Ok(pdf),
        Ok(Err(e)) => Err(e.to_string()),
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(format!("{} layout panicked: {detail}", engine.name()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::PagePlan;

    struct BrokenLayout;

    impl LayoutEngine for BrokenLayout {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn plan(&self, _doc: &RenderedDocument) -> Result<PagePlan, RenderError> {
            Err(RenderError::Layout {
                engine: "broken",
                message: "style table unavailable".to_string(),
            })
        }
    }

    struct PanickingLayout;

    impl LayoutEngine for PanickingLayout {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn plan(&self, _doc: &RenderedDocument) -> Result<PagePlan, RenderError> {
            panic!("glyph table corrupted")
        }
    }

    const SAMPLE: &str = "# Jane Doe\n## Experience\n### Acme Corp\n- **Led** migration\n1. First\nPlain text";

    #[test]
    fn test_primary_engine_used_when_it_works() {
        let doc = parse_markdown(SAMPLE);
        let outcome =
            render_document(&doc, &StyledLayout::default(), &BasicLayout::default()).unwrap();
        assert_eq!(outcome.engine, "styled");
        assert!(!outcome.used_fallback);
        assert!(outcome.pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_failing_primary_falls_back_with_all_lines() {
        let doc = parse_markdown(SAMPLE);
        let outcome = render_document(&doc, &BrokenLayout, &BasicLayout::default()).unwrap();

        assert_eq!(outcome.engine, "basic");
        assert!(outcome.used_fallback);
        assert!(outcome.pdf.starts_with(b"%PDF"));

        let plan = BasicLayout::default().plan(&doc).unwrap();
        let placed = plan.page_text(0);
        for expected in [
            "Jane Doe",
            "Experience",
            "Acme Corp",
            "- Led migration",
            "1. First",
            "Plain text",
        ] {
            assert!(placed.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_panicking_primary_falls_back() {
        let doc = parse_markdown(SAMPLE);
        let outcome = render_document(&doc, &PanickingLayout, &BasicLayout::default()).unwrap();
        assert!(outcome.used_fallback);
    }

    #[test]
    fn test_both_engines_failing_reports_both() {
        let doc = parse_markdown(SAMPLE);
        let err = render_document(&doc, &BrokenLayout, &PanickingLayout).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("style table unavailable"));
        assert!(message.contains("glyph table corrupted"));
    }

    #[test]
    fn test_missing_file_is_a_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_markdown_file(&dir.path().join("tailored_resume.md")).unwrap_err();
        assert!(matches!(err, RenderError::Source { .. }));
    }

    #[test]
    fn test_renders_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tailored_resume.md");
        std::fs::write(&path, SAMPLE).unwrap();

        let outcome = render_markdown_file(&path).unwrap();
        assert!(outcome.pdf.starts_with(b"%PDF"));
    }
}
