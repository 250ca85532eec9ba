//! Cover-letter assembly: turns ranked experiences plus job and company context into a
//! single prompt, and parses the generator's reply.
//!
//! Unparseable replies fail with `GenerationFormatError`. There is no raw-text fallback.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::cover_letter::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM, DEFAULT_SALUTATION, NO_COMPANY_CONTEXT,
};
use crate::errors::AppError;
use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{fill_template, strip_json_fences, TextGenerator};
use crate::ranking::ScoredCandidate;

#[derive(Debug, Error)]
pub enum GenerationFormatError {
    #[error("generator output is not JSON: {0}")]
    NotJson(String),

    #[error("generator output has the wrong shape: {0}")]
    WrongShape(String),

    #[error("generator returned an empty cover letter")]
    EmptyLetter,
}

/// Job facts the prompt is built around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMetadata {
    pub job_title: String,
    pub company_name: String,
    pub hiring_manager: Option<String>,
    pub job_description: String,
    pub tone: String,
    pub max_length: u32,
}

/// The three fields the generator must return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedLetter {
    pub cover_letter: String,
    /// Qualitative label, e.g. "Good".
    pub chances: String,
    pub chances_explanation: String,
}

pub fn build_prompt(
    ranked: &[ScoredCandidate],
    company_context: &str,
    job: &JobMetadata,
) -> String {
    let experiences = ranked
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. [{:.2}] {}", i + 1, s.score, s.candidate.text.trim()))
        .collect::<Vec<_>>()
        .join("\n");

    let company_context = if company_context.trim().is_empty() {
        NO_COMPANY_CONTEXT
    } else {
        company_context.trim()
    };

    let salutation = job
        .hiring_manager
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SALUTATION);

    let max_length = job.max_length.to_string();

    fill_template(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("job_title", &job.job_title),
            ("company_name", &job.company_name),
            ("salutation", salutation),
            ("tone", &job.tone),
            ("max_length", &max_length),
            ("job_description", job.job_description.trim()),
            ("experiences", &experiences),
            ("company_context", company_context),
        ],
    )
}

pub fn system_prompt() -> String {
    format!("{COVER_LETTER_SYSTEM} {JSON_ONLY_SYSTEM}")
}

/// Strict parse: a JSON object with three string fields and a non-blank letter.
pub fn parse_generation(raw: &str) -> Result<GeneratedLetter, GenerationFormatError> {
    let text = strip_json_fences(raw);

    let value: Value =
        serde_json::from_str(text).map_err(|_| GenerationFormatError::NotJson(preview(raw)))?;

    if !value.is_object() {
        return Err(GenerationFormatError::WrongShape(
            "expected a JSON object".to_string(),
        ));
    }

    let letter: GeneratedLetter = serde_json::from_value(value)
        .map_err(|e| GenerationFormatError::WrongShape(e.to_string()))?;

    if letter.cover_letter.trim().is_empty() {
        return Err(GenerationFormatError::EmptyLetter);
    }

    Ok(letter)
}

/// Builds the prompt, calls the generator once, and parses the reply.
pub async fn assemble_cover_letter(
    llm: &dyn TextGenerator,
    ranked: &[ScoredCandidate],
    company_context: &str,
    job: &JobMetadata,
) -> Result<GeneratedLetter, AppError> {
    let prompt = build_prompt(ranked, company_context, job);

    let raw = llm
        .generate(&prompt, &system_prompt())
        .await
        .map_err(|e| AppError::Llm(format!("Cover letter generation failed: {e}")))?;

    let letter = parse_generation(&raw)?;
    info!(
        "Generated cover letter for {:?} at {:?}: {} chars, chances={}",
        job.job_title,
        job.company_name,
        letter.cover_letter.len(),
        letter.chances
    );
    Ok(letter)
}

fn preview(raw: &str) -> String {
    raw.chars().take(80).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::tests::EchoGenerator;
    use crate::ranking::Candidate;
    use uuid::Uuid;

    fn job() -> JobMetadata {
        JobMetadata {
            job_title: "Backend Engineer".to_string(),
            company_name: "Acme".to_string(),
            hiring_manager: None,
            job_description: "Build distributed systems in Rust.".to_string(),
            tone: "professional".to_string(),
            max_length: 400,
        }
    }

    fn scored(text: &str, score: f32) -> ScoredCandidate {
        ScoredCandidate {
            candidate: Candidate {
                id: Uuid::new_v4(),
                text: text.to_string(),
            },
            score,
        }
    }

    const GOOD_REPLY: &str = r#"{"cover_letter": "Dear Hiring Manager, ...", "chances": "Good", "chances_explanation": "Strong Rust background."}"#;

    #[test]
    fn test_prompt_lists_experiences_in_rank_order() {
        let prompt = build_prompt(
            &[scored("Acme SRE  queues", 0.91), scored("Initech dev  CRUD", 0.4)],
            "Acme builds rockets.",
            &job(),
        );
        let first = prompt.find("1. [0.91] Acme SRE  queues").unwrap();
        let second = prompt.find("2. [0.40] Initech dev  CRUD").unwrap();
        assert!(first < second);
        assert!(prompt.contains("Acme builds rockets."));
        assert!(prompt.contains("at most 400 words"));
        for placeholder in ["{job_title}", "{experiences}", "{company_context}", "{salutation}"] {
            assert!(!prompt.contains(placeholder), "unfilled {placeholder}");
        }
    }

    #[test]
    fn test_placeholders_in_user_text_are_inserted_verbatim() {
        let mut braced = job();
        braced.job_title = "Eng {job_description}".to_string();
        braced.job_description = "Needs {company_context} and {experiences} skill".to_string();

        let prompt = build_prompt(&[scored("Rust at Acme", 0.8)], "SECRET_CTX", &braced);

        assert!(prompt.contains("position of Eng {job_description} at Acme."));
        assert!(prompt.contains("Needs {company_context} and {experiences} skill"));
        assert_eq!(prompt.matches("SECRET_CTX").count(), 1);
        assert_eq!(prompt.matches("Rust at Acme").count(), 1);
    }

    #[test]
    fn test_prompt_defaults_salutation_and_company_context() {
        let prompt = build_prompt(&[], "   ", &job());
        assert!(prompt.contains("Address it to: Hiring Manager"));
        assert!(prompt.contains(NO_COMPANY_CONTEXT));

        let mut named = job();
        named.hiring_manager = Some("Ada Lovelace".to_string());
        assert!(build_prompt(&[], "", &named).contains("Address it to: Ada Lovelace"));
    }

    #[test]
    fn test_parse_accepts_fenced_json() {
        let fenced = format!("```json\n{GOOD_REPLY}\n```");
        let letter = parse_generation(&fenced).unwrap();
        assert_eq!(letter.chances, "Good");
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        let result = parse_generation("Dear Hiring Manager, I am thrilled to apply...");
        assert!(matches!(result, Err(GenerationFormatError::NotJson(_))));
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let result = parse_generation(r#"{"cover_letter": "Dear team", "chances": "High"}"#);
        assert!(matches!(result, Err(GenerationFormatError::WrongShape(_))));
    }

    #[test]
    fn test_parse_rejects_non_object_and_wrong_types() {
        assert!(matches!(
            parse_generation(r#"["a", "b", "c"]"#),
            Err(GenerationFormatError::WrongShape(_))
        ));
        assert!(matches!(
            parse_generation(r#"{"cover_letter": "x", "chances": 3, "chances_explanation": "y"}"#),
            Err(GenerationFormatError::WrongShape(_))
        ));
    }

    #[test]
    fn test_parse_rejects_blank_letter() {
        let result = parse_generation(
            r#"{"cover_letter": "  ", "chances": "Low", "chances_explanation": ""}"#,
        );
        assert!(matches!(result, Err(GenerationFormatError::EmptyLetter)));
    }

    #[tokio::test]
    async fn test_non_json_generation_fails_without_partial_result() {
        let llm = EchoGenerator::new("Sorry, I can't produce JSON today.");
        let result =
            assemble_cover_letter(&llm, &[scored("Acme SRE", 0.8)], "", &job()).await;
        assert!(matches!(result, Err(AppError::GenerationFormat(_))));
    }

    #[tokio::test]
    async fn test_well_formed_generation_parses() {
        let llm = EchoGenerator::new(GOOD_REPLY);
        let letter = assemble_cover_letter(&llm, &[scored("Acme SRE", 0.8)], "ctx", &job())
            .await
            .unwrap();
        assert_eq!(letter.chances_explanation, "Strong Rust background.");
        assert_eq!(llm.prompts.lock().unwrap().len(), 1);
    }
}
