// All LLM prompt constants for the tailoring pipeline.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Wrapper every task is sent through.
/// Replace: {description}, {expected_output}, {tool_material}, {context}
pub const TASK_PROMPT_TEMPLATE: &str = r#"TASK:
{description}

EXPECTED OUTPUT:
{expected_output}

GATHERED MATERIAL (pages, search results, resume text):
{tool_material}

OUTPUTS OF EARLIER TASKS:
{context}

Respond with the expected output only. No preamble, no closing remarks."#;

// ────────────────────────────────────────────────────────────────────────────
// Step 1: job analysis
// ────────────────────────────────────────────────────────────────────────────

/// Replace: {job_url}
pub const JOB_ANALYSIS_DESCRIPTION: &str = r#"Analyze the job posting at {job_url}.
Extract the key skills, experiences, and qualifications the role requires.
Separate hard requirements from nice-to-haves and list the keywords an applicant
tracking system is likely to screen for."#;

pub const JOB_ANALYSIS_EXPECTED: &str = "A structured list of job requirements: \
    required skills, preferred skills, qualifications, experience level, and ATS keywords.";

// ────────────────────────────────────────────────────────────────────────────
// Step 2: candidate profile
// ────────────────────────────────────────────────────────────────────────────

/// Replace: {github_url}, {resume_path}, {summary}
pub const CANDIDATE_PROFILE_DESCRIPTION: &str = r#"Compile a detailed profile of the candidate.
Sources:
- GitHub profile: {github_url}
- Resume file: {resume_path}
- Candidate's own summary: {summary}

Combine these into one picture of the candidate's skills, work history,
projects, and education. Note where the sources agree and where one source
adds something the others lack."#;

pub const CANDIDATE_PROFILE_EXPECTED: &str = "A comprehensive candidate profile: \
    technical skills, work experience with dates, notable projects, education, \
    and any other strengths supported by the sources.";

// ────────────────────────────────────────────────────────────────────────────
// Step 3: resume writing
// ────────────────────────────────────────────────────────────────────────────

pub const RESUME_WRITING_DESCRIPTION: &str = r#"Using the job requirements and the candidate profile from the
earlier tasks, rewrite the candidate's resume so it highlights the most relevant
qualifications for this role.

Rules:
- Keep every statement grounded in the candidate profile.
- Work the job's keywords in where the profile supports them.
- Order experience and projects by relevance to the role."#;

pub const RESUME_WRITING_EXPECTED: &str = r#"A complete markdown resume with exactly these parts, in order:
# Candidate Name
contact line
## Summary
## Skills
## Experience
## Projects
## Education"#;

// ────────────────────────────────────────────────────────────────────────────
// Step 4: interview preparation
// ────────────────────────────────────────────────────────────────────────────

pub const INTERVIEW_PREP_DESCRIPTION: &str = r#"Prepare the candidate for interviews for this role.
Using the job requirements, the candidate profile, and the tailored resume from
the earlier tasks, write the questions an interviewer is most likely to ask and
guidance on how this candidate should answer each one, drawing on their real
experience."#;

pub const INTERVIEW_PREP_EXPECTED: &str = r#"A markdown document with exactly ten numbered units.
Each unit is a '### ' heading holding the question, followed by '-' bullets with
talking points that reference the candidate's actual experience."#;
