//! Reads the uploaded resume for the candidate-profile task.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::artifacts::ResumeFormat;

/// Returns the text of the resume at `path`.
///
/// PDFs and DOCX files go through text extraction. Legacy `.doc` files are not
/// parsed; the model is told the file exists and leans on the other sources.
pub async fn read_resume(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("resume file {} does not exist", path.display());
    }

    let format = ResumeFormat::from_path(path)
        .with_context(|| format!("unsupported resume file {}", path.display()))?;

    match format {
        ResumeFormat::Pdf => {
            let owned = path.to_path_buf();
            let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
                .await
                .context("PDF extraction task panicked")?
                .with_context(|| format!("could not extract text from {}", path.display()))?;
            if text.trim().is_empty() {
                bail!("{} contains no extractable text", path.display());
            }
            Ok(text)
        }
        ResumeFormat::Docx => {
            let owned = path.to_path_buf();
            let text = tokio::task::spawn_blocking(move || extract_docx_text(&owned))
                .await
                .context("DOCX extraction task panicked")?
                .with_context(|| format!("could not extract text from {}", path.display()))?;
            if text.trim().is_empty() {
                bail!("{} contains no extractable text", path.display());
            }
            Ok(text)
        }
        ResumeFormat::Doc => Ok(format!(
            "The candidate uploaded {} ({}). Its text could not be extracted; \
             rely on the summary and GitHub profile for details.",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            format.extension()
        )),
    }
}

/// Collects the `<w:t>` runs of `word/document.xml`, one line per paragraph.
fn extract_docx_text(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).context("not a DOCX archive")?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("DOCX archive has no word/document.xml")?
        .read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run_text = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => text.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(text)
}
