//! Company research: web search plus LLM summarisation, used to enrich cover letters.
//!
//! Search is optional: `AppState.search` is `None` when no SerpAPI key is configured.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::llm_client::{fill_template, LlmError, TextGenerator};

pub mod handlers;
pub mod prompts;

use prompts::{COMPANY_CONTEXT_PROMPT_TEMPLATE, COMPANY_SUMMARY_PROMPT_TEMPLATE, RESEARCH_SYSTEM};

const SERPAPI_URL: &str = "https://serpapi.com/search.json";
/// Organic results beyond this rarely add anything the summary uses.
const MAX_ORGANIC_RESULTS: usize = 6;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("search returned no usable results")]
    NoResults,
}

#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("company search is not configured")]
    NotConfigured,

    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("summary generation failed: {0}")]
    Llm(#[from] LlmError),
}

/// Free-text web search.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, SearchError>;
}

#[derive(Clone)]
pub struct SerpApiClient {
    client: Client,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    answer_box: Option<SerpSnippet>,
    #[serde(default)]
    knowledge_graph: Option<KnowledgeGraph>,
    #[serde(default)]
    organic_results: Vec<SerpSnippet>,
}

#[derive(Debug, Default, Deserialize)]
struct SerpSnippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct KnowledgeGraph {
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl WebSearch for SerpApiClient {
    async fn search(&self, query: &str) -> Result<String, SearchError> {
        let response = self
            .client
            .get(SERPAPI_URL)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body: SerpResponse = if status.is_success() {
            response.json().await?
        } else {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        };

        if let Some(message) = body.error.clone() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = flatten_results(&body);
        debug!("Search for {query:?} produced {} chars", text.len());
        if text.is_empty() {
            return Err(SearchError::NoResults);
        }
        Ok(text)
    }
}

/// One line per snippet: answer box, knowledge graph, then organic results.
fn flatten_results(body: &SerpResponse) -> String {
    let mut lines = Vec::new();

    if let Some(answer) = &body.answer_box {
        if let Some(text) = answer.answer.as_ref().or(answer.snippet.as_ref()) {
            lines.push(text.trim().to_string());
        }
    }
    if let Some(description) = body
        .knowledge_graph
        .as_ref()
        .and_then(|kg| kg.description.as_ref())
    {
        lines.push(description.trim().to_string());
    }
    for result in body.organic_results.iter().take(MAX_ORGANIC_RESULTS) {
        match (&result.title, &result.snippet) {
            (Some(title), Some(snippet)) => {
                lines.push(format!("{}: {}", title.trim(), snippet.trim()))
            }
            (None, Some(snippet)) => lines.push(snippet.trim().to_string()),
            _ => {}
        }
    }

    lines.retain(|l| !l.is_empty());
    lines.join("\n")
}

pub fn search_query_for(company_name: &str) -> String {
    format!("{company_name} company mission values news products services")
}

/// Everything the research endpoint reports about a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyResearch {
    pub company_name: String,
    pub search_results: String,
    pub summary: String,
    /// Only present when a job description was supplied.
    pub context: Option<String>,
}

/// Search, summarise, and (given a job description) explain why the role fits.
pub async fn research_company(
    search: &dyn WebSearch,
    llm: &dyn TextGenerator,
    company_name: &str,
    job_description: Option<&str>,
) -> Result<CompanyResearch, ResearchError> {
    let search_results = search.search(&search_query_for(company_name)).await?;

    let prompt = fill_template(
        COMPANY_SUMMARY_PROMPT_TEMPLATE,
        &[
            ("company_name", company_name),
            ("search_results", &search_results),
        ],
    );
    let summary = llm.generate(&prompt, RESEARCH_SYSTEM).await?;

    let context = match job_description.filter(|jd| !jd.trim().is_empty()) {
        Some(jd) => Some(generate_context(llm, company_name, jd, &search_results).await?),
        None => None,
    };

    info!("Researched company {company_name:?}");

    Ok(CompanyResearch {
        company_name: company_name.to_string(),
        search_results,
        summary: summary.trim().to_string(),
        context,
    })
}

/// The single paragraph of company context that goes into a cover-letter prompt.
pub async fn company_context_for_letter(
    search: &dyn WebSearch,
    llm: &dyn TextGenerator,
    company_name: &str,
    job_description: &str,
) -> Result<String, ResearchError> {
    let search_results = search.search(&search_query_for(company_name)).await?;
    generate_context(llm, company_name, job_description, &search_results).await
}

async fn generate_context(
    llm: &dyn TextGenerator,
    company_name: &str,
    job_description: &str,
    search_results: &str,
) -> Result<String, ResearchError> {
    let prompt = fill_template(
        COMPANY_CONTEXT_PROMPT_TEMPLATE,
        &[
            ("company_name", company_name),
            ("job_description", job_description),
            ("search_results", search_results),
        ],
    );
    Ok(llm.generate(&prompt, RESEARCH_SYSTEM).await?.trim().to_string())
}
