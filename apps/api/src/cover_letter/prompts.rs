// Prompt constants for cover-letter generation.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Prefix for the generation system prompt; `JSON_ONLY_SYSTEM` is appended at call time.
pub const COVER_LETTER_SYSTEM: &str = "You are an expert career coach who writes \
    tailored, honest cover letters and candidly assesses a candidate's chances.";

/// Cover-letter prompt template.
/// Replace: {grounding_instruction}, {job_title}, {company_name}, {salutation},
///          {tone}, {max_length}, {job_description}, {experiences}, {company_context}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"{grounding_instruction}

Write a cover letter for the position of {job_title} at {company_name}.

Address it to: {salutation}
Tone: {tone}
Length: at most {max_length} words.

JOB DESCRIPTION:
{job_description}

CANDIDATE EXPERIENCES (most relevant first, with relevance score):
{experiences}

ABOUT THE COMPANY:
{company_context}

The letter must:
1. Show genuine enthusiasm for {company_name}
2. Connect the experiences above to the job requirements explicitly
3. Stay within the length limit

Then judge the candidate's chance of getting an interview from the same evidence.

Return a JSON object with EXACTLY these keys:
{
  "cover_letter": "the full letter text, paragraphs separated by \n\n",
  "chances": "one of: Low, Moderate, Good, High",
  "chances_explanation": "two or three sentences explaining the rating"
}"#;

pub const NO_COMPANY_CONTEXT: &str = "(no company research available; rely on the job description)";
pub const DEFAULT_SALUTATION: &str = "Hiring Manager";
