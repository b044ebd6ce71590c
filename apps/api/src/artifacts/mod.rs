// Files on disk: the uploaded resume and the two generated markdown documents.
// All live directly in the configured working directory and are overwritten per run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

pub mod handlers;

/// Accepted resume upload formats, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Docx,
    Doc,
}

impl ResumeFormat {
    pub const ALL: [ResumeFormat; 3] = [ResumeFormat::Pdf, ResumeFormat::Docx, ResumeFormat::Doc];

    pub fn extension(&self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "pdf",
            ResumeFormat::Docx => "docx",
            ResumeFormat::Doc => "doc",
        }
    }

    /// Matches a file name's extension case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        ResumeFormat::ALL.into_iter().find(|f| f.extension() == ext)
    }

    pub fn file_name(&self) -> String {
        format!("resume.{}", self.extension())
    }
}

/// Returns the uploaded resume in `work_dir`, checking pdf, then docx, then doc.
pub fn find_resume(work_dir: &Path) -> Option<PathBuf> {
    ResumeFormat::ALL
        .iter()
        .map(|f| work_dir.join(f.file_name()))
        .find(|p| p.is_file())
}

/// Stores an upload as `resume.<ext>`, removing any earlier upload in another format
/// so the lookup order cannot pick a stale file.
pub async fn save_resume(work_dir: &Path, format: ResumeFormat, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(work_dir)
        .await
        .with_context(|| format!("Failed to create working directory {}", work_dir.display()))?;

    for other in ResumeFormat::ALL.iter().filter(|f| **f != format) {
        let stale = work_dir.join(other.file_name());
        if stale.is_file() {
            tokio::fs::remove_file(&stale)
                .await
                .with_context(|| format!("Failed to remove {}", stale.display()))?;
        }
    }

    let path = work_dir.join(format.file_name());
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "Saved resume upload");
    Ok(path)
}
