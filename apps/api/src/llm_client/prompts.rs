// Cross-cutting prompt fragments shared by every pipeline task.
// Task-specific templates live in pipeline::prompts.

/// Appended to every agent's system prompt.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Use only facts present in the material you are given. \
    Do NOT invent employers, dates, degrees, metrics, or skills. \
    If the material does not support a claim, leave it out.";

/// Formatting rules for documents that end up in the PDF renderer.
pub const ATS_MARKDOWN_INSTRUCTION: &str = "\
    Format the document as plain markdown that an applicant tracking system can parse: \
    a single column, '#' for the name, '##' for section headings, '###' for roles or projects, \
    '-' for bullets. Do NOT use tables, images, HTML, or code fences.";
