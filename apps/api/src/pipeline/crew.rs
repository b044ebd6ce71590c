//! The crew: four agent personas and the task chain they work through.
//!
//! The roster is built once per process and shared by every run.

use std::path::Path;
use std::sync::OnceLock;

use tracing::info;

use crate::llm_client::prompts::{ATS_MARKDOWN_INSTRUCTION, NO_FABRICATION_INSTRUCTION};
use crate::pipeline::prompts::*;
use crate::pipeline::task::TaskSpec;
use crate::pipeline::TailorInputs;
use crate::tools::Tool;

pub const JOB_ANALYSIS: &str = "job_analysis";
pub const CANDIDATE_PROFILE: &str = "candidate_profile";
pub const RESUME_WRITING: &str = "resume_writing";
pub const INTERVIEW_PREP: &str = "interview_prep";

pub const RESUME_FILE: &str = "tailored_resume.md";
pub const INTERVIEW_FILE: &str = "interview_materials.md";

/// A persona a task is performed as.
#[derive(Debug)]
pub struct AgentProfile {
    pub role: &'static str,
    /// Role, backstory, and goal plus the shared rules.
    pub system_prompt: String,
}

impl AgentProfile {
    fn new(
        role: &'static str,
        goal: &'static str,
        backstory: &'static str,
        writes_documents: bool,
    ) -> Self {
        let mut system_prompt =
            format!("You are a {role}.\n{backstory}\n\nYour goal: {goal}\n\n{NO_FABRICATION_INSTRUCTION}");
        if writes_documents {
            system_prompt.push_str("\n\n");
            system_prompt.push_str(ATS_MARKDOWN_INSTRUCTION);
        }
        Self {
            role,
            system_prompt,
        }
    }
}

#[derive(Debug)]
pub struct Roster {
    pub job_researcher: AgentProfile,
    pub candidate_profiler: AgentProfile,
    pub resume_strategist: AgentProfile,
    pub interview_preparer: AgentProfile,
}

impl Roster {
    fn build() -> Self {
        info!("Assembling agent roster");
        Roster {
            job_researcher: AgentProfile::new(
                "Tech Job Researcher",
                "Analyze job postings so applicants know exactly what the role demands",
                "You dig into job postings across the software industry and pull out \
                 the skills, qualifications, and keywords that hiring teams screen for.",
                false,
            ),
            candidate_profiler: AgentProfile::new(
                "Personal Profiler for Engineers",
                "Research job applicants so their strengths are fully understood",
                "You build thorough, accurate profiles of engineers from their public \
                 work, their resume, and their own words.",
                false,
            ),
            resume_strategist: AgentProfile::new(
                "Resume Strategist for Engineers",
                "Make a resume stand out for a specific role without overstating anything",
                "You rewrite resumes so the candidate's most relevant, verifiable \
                 qualifications are the first thing a recruiter reads.",
                true,
            ),
            interview_preparer: AgentProfile::new(
                "Engineering Interview Preparer",
                "Produce interview questions and talking points grounded in the candidate's resume",
                "You coach engineers for interviews by predicting the questions a role \
                 will bring up and tying every answer to the candidate's real experience.",
                true,
            ),
        }
    }
}

/// Returns the process-wide roster, building it on first use.
pub fn roster() -> &'static Roster {
    static ROSTER: OnceLock<Roster> = OnceLock::new();
    ROSTER.get_or_init(Roster::build)
}

/// Builds the four-task chain for one run.
///
/// Resume writing consumes job analysis then candidate profile; interview prep
/// consumes all three earlier outputs. Results of steps 3 and 4 are written to
/// `work_dir` as soon as each completes.
pub fn build_tasks(inputs: &TailorInputs, work_dir: &Path) -> Vec<TaskSpec> {
    let crew = roster();
    let resume_path = inputs.resume_path.display().to_string();

    vec![
        TaskSpec {
            id: JOB_ANALYSIS.to_string(),
            agent: &crew.job_researcher,
            description: JOB_ANALYSIS_DESCRIPTION.replace("{job_url}", &inputs.job_url),
            expected_output: JOB_ANALYSIS_EXPECTED.to_string(),
            dependencies: vec![],
            tools: vec![
                Tool::ScrapeWebsite {
                    url: inputs.job_url.clone(),
                },
                Tool::WebSearch {
                    query: format!("{} job requirements", inputs.job_url),
                },
            ],
            output_file: None,
        },
        TaskSpec {
            id: CANDIDATE_PROFILE.to_string(),
            agent: &crew.candidate_profiler,
            description: CANDIDATE_PROFILE_DESCRIPTION
                .replace("{github_url}", &inputs.github_url)
                .replace("{resume_path}", &resume_path)
                .replace("{summary}", &inputs.summary),
            expected_output: CANDIDATE_PROFILE_EXPECTED.to_string(),
            dependencies: vec![],
            tools: vec![
                Tool::ScrapeWebsite {
                    url: inputs.github_url.clone(),
                },
                Tool::WebSearch {
                    query: format!("{} projects", inputs.github_url),
                },
                Tool::ReadResume {
                    path: inputs.resume_path.clone(),
                },
            ],
            output_file: None,
        },
        TaskSpec {
            id: RESUME_WRITING.to_string(),
            agent: &crew.resume_strategist,
            description: RESUME_WRITING_DESCRIPTION.to_string(),
            expected_output: RESUME_WRITING_EXPECTED.to_string(),
            dependencies: vec![JOB_ANALYSIS.to_string(), CANDIDATE_PROFILE.to_string()],
            tools: vec![],
            output_file: Some(work_dir.join(RESUME_FILE)),
        },
        TaskSpec {
            id: INTERVIEW_PREP.to_string(),
            agent: &crew.interview_preparer,
            description: INTERVIEW_PREP_DESCRIPTION.to_string(),
            expected_output: INTERVIEW_PREP_EXPECTED.to_string(),
            dependencies: vec![
                JOB_ANALYSIS.to_string(),
                CANDIDATE_PROFILE.to_string(),
                RESUME_WRITING.to_string(),
            ],
            tools: vec![],
            output_file: Some(work_dir.join(INTERVIEW_FILE)),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::ModelChoice;
    use std::path::PathBuf;

    fn inputs() -> TailorInputs {
        TailorInputs {
            job_url: "https://jobs.example.com/rust".to_string(),
            github_url: "https://github.com/jane".to_string(),
            summary: "Systems engineer, 6 years of Rust".to_string(),
            resume_path: PathBuf::from("/tmp/work/resume.pdf"),
            model: ModelChoice::default(),
        }
    }

    #[test]
    fn test_roster_is_built_once() {
        let first = roster() as *const Roster;
        let second = roster() as *const Roster;
        assert_eq!(first, second);
    }

    #[test]
    fn test_document_writers_get_formatting_rules() {
        let crew = roster();
        assert!(crew.resume_strategist.system_prompt.contains("Do NOT use tables"));
        assert!(!crew.job_researcher.system_prompt.contains("Do NOT use tables"));
        assert!(crew.job_researcher.system_prompt.contains("Do NOT invent"));
    }

    #[test]
    fn test_build_tasks_wires_chain() {
        let tasks = build_tasks(&inputs(), Path::new("/tmp/work"));
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![JOB_ANALYSIS, CANDIDATE_PROFILE, RESUME_WRITING, INTERVIEW_PREP]
        );
        assert!(tasks[0].dependencies.is_empty());
        assert!(tasks[1].dependencies.is_empty());
        assert_eq!(tasks[2].dependencies, vec![JOB_ANALYSIS, CANDIDATE_PROFILE]);
        assert_eq!(
            tasks[3].dependencies,
            vec![JOB_ANALYSIS, CANDIDATE_PROFILE, RESUME_WRITING]
        );
    }

    #[test]
    fn test_build_tasks_fills_templates() {
        let tasks = build_tasks(&inputs(), Path::new("/tmp/work"));
        assert!(tasks[0].description.contains("https://jobs.example.com/rust"));
        assert!(tasks[1].description.contains("https://github.com/jane"));
        assert!(tasks[1].description.contains("/tmp/work/resume.pdf"));
        assert!(tasks[1].description.contains("6 years of Rust"));
        for task in &tasks {
            assert!(!task.description.contains('{'), "unfilled placeholder in {}", task.id);
        }
    }

    #[test]
    fn test_research_tasks_gather_material() {
        let tasks = build_tasks(&inputs(), Path::new("/tmp/work"));
        assert!(matches!(&tasks[0].tools[0], Tool::ScrapeWebsite { url } if url.contains("jobs.example.com")));
        assert!(tasks[1]
            .tools
            .iter()
            .any(|t| matches!(t, Tool::ReadResume { path } if path.ends_with("resume.pdf"))));
        assert!(tasks[2].tools.is_empty());
        assert!(tasks[3].tools.is_empty());
    }

    #[test]
    fn test_only_document_tasks_write_files() {
        let tasks = build_tasks(&inputs(), Path::new("/tmp/work"));
        assert!(tasks[0].output_file.is_none());
        assert!(tasks[1].output_file.is_none());
        assert_eq!(
            tasks[2].output_file.as_deref(),
            Some(Path::new("/tmp/work/tailored_resume.md"))
        );
        assert_eq!(
            tasks[3].output_file.as_deref(),
            Some(Path::new("/tmp/work/interview_materials.md"))
        );
    }
}
