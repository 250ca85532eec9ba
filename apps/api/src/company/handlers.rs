use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::AuthUser;
use crate::company::{research_company, CompanyResearch, ResearchError};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompanySearchRequest {
    pub company_name: String,
    pub job_description: Option<String>,
}

/// Research failures are reported in `error` with a 200; the client decides what to show.
#[derive(Debug, Default, Serialize)]
pub struct CompanySearchResponse {
    pub company_name: String,
    pub search_results: Option<String>,
    pub summary: Option<String>,
    pub context: Option<String>,
    pub error: Option<String>,
}

impl CompanySearchResponse {
    fn from_result(company_name: &str, result: Result<CompanyResearch, ResearchError>) -> Self {
        match result {
            Ok(r) => Self {
                company_name: r.company_name,
                search_results: Some(r.search_results),
                summary: Some(r.summary),
                context: r.context,
                error: None,
            },
            Err(e) => {
                warn!("Company research for {company_name:?} failed: {e}");
                Self {
                    company_name: company_name.to_string(),
                    error: Some(e.to_string()),
                    ..Default::default()
                }
            }
        }
    }
}

/// POST /api/v1/company-search
pub async fn handle_company_search(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<CompanySearchRequest>,
) -> Result<Json<CompanySearchResponse>, AppError> {
    let company_name = req.company_name.trim();
    if company_name.is_empty() {
        return Err(AppError::Validation(
            "company_name cannot be empty".to_string(),
        ));
    }

    let result = match state.search.as_deref() {
        Some(search) => {
            research_company(
                search,
                &state.llm,
                company_name,
                req.job_description.as_deref(),
            )
            .await
        }
        None => Err(ResearchError::NotConfigured),
    };

    let response = CompanySearchResponse::from_result(company_name, result);
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_populates_error_field_only() {
        let response =
            CompanySearchResponse::from_result("Acme", Err(ResearchError::NotConfigured));
        assert_eq!(response.company_name, "Acme");
        assert_eq!(
            response.error.as_deref(),
            Some("company search is not configured")
        );
        assert!(response.summary.is_none());
    }

    #[test]
    fn test_success_has_no_error() {
        let response = CompanySearchResponse::from_result(
            "Acme",
            Ok(CompanyResearch {
                company_name: "Acme".into(),
                search_results: "r".into(),
                summary: "s".into(),
                context: None,
            }),
        );
        assert!(response.error.is_none());
        assert_eq!(response.summary.as_deref(), Some("s"));
    }
}
