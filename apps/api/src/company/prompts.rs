// Prompt constants for company research.

pub const RESEARCH_SYSTEM: &str = "You are a careful research assistant helping a candidate \
    write a cover letter. Use only the search results you are given. \
    Respond with plain prose, no headings, no lists.";

/// Replace: {company_name}, {search_results}
pub const COMPANY_SUMMARY_PROMPT_TEMPLATE: &str = r#"The user is applying to a job at {company_name}.

Here is information about the company from a web search:
{search_results}

Write one paragraph about {company_name}: who they are and why someone would be excited to join them.
Focus on their mission, values, culture, and recent developments.
Keep the tone professional but enthusiastic."#;

/// Replace: {company_name}, {job_description}, {search_results}
pub const COMPANY_CONTEXT_PROMPT_TEMPLATE: &str = r#"The user is applying to a job at {company_name}.

Job Description:
{job_description}

Here is information about the company from a web search:
{search_results}

Write one paragraph about why this specific role at {company_name} is a great fit for the candidate.
Focus on how the company's mission, values, and culture align with the job requirements.
Keep the tone professional but enthusiastic."#;
