// Experience records: CRUD plus the text each record contributes to relevance ranking.

pub mod handlers;
pub mod repository;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::experience::ExperienceRow;
use crate::ranking::Candidate;

pub const DEFAULT_TOP_K: usize = 3;
pub const MAX_TOP_K: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateExperienceRequest {
    pub company_name: String,
    pub title: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    pub description: String,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateExperienceRequest {
    pub company_name: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: Option<bool>,
    pub description: Option<String>,
}

/// Fully-resolved field values, ready to write.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceFields {
    pub company_name: String,
    pub title: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub description: String,
}

impl From<CreateExperienceRequest> for ExperienceFields {
    fn from(req: CreateExperienceRequest) -> Self {
        Self {
            company_name: req.company_name,
            title: req.title,
            location: req.location,
            start_date: req.start_date,
            end_date: req.end_date,
            is_current: req.is_current,
            description: req.description,
        }
    }
}

impl ExperienceFields {
    pub fn from_row(row: &ExperienceRow) -> Self {
        Self {
            company_name: row.company_name.clone(),
            title: row.title.clone(),
            location: row.location.clone(),
            start_date: row.start_date,
            end_date: row.end_date,
            is_current: row.is_current,
            description: row.description.clone(),
        }
    }

    pub fn apply(mut self, patch: UpdateExperienceRequest) -> Self {
        if let Some(v) = patch.company_name {
            self.company_name = v;
        }
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.location {
            self.location = Some(v);
        }
        if let Some(v) = patch.start_date {
            self.start_date = v;
        }
        if let Some(v) = patch.end_date {
            self.end_date = Some(v);
        }
        if let Some(v) = patch.is_current {
            self.is_current = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("company_name", &self.company_name),
            ("title", &self.title),
            ("description", &self.description),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{name} cannot be empty")));
            }
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(AppError::Validation(
                    "end_date cannot be before start_date".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn content_for_embedding(&self) -> String {
        content_for_embedding(
            &self.company_name,
            &self.title,
            self.location.as_deref(),
            &self.description,
        )
    }
}

/// `"{company} {title} {location} {description}"`, with an empty slot for a missing location.
pub fn content_for_embedding(
    company_name: &str,
    title: &str,
    location: Option<&str>,
    description: &str,
) -> String {
    format!(
        "{} {} {} {}",
        company_name,
        title,
        location.unwrap_or(""),
        description
    )
}

pub fn to_candidate(row: &ExperienceRow) -> Candidate {
    Candidate {
        id: row.id,
        text: row.content_for_embedding.clone(),
    }
}

/// `None` → default; otherwise must be within 1..=MAX_TOP_K.
pub fn resolve_top_k(top_k: Option<usize>) -> Result<usize, AppError> {
    match top_k {
        None => Ok(DEFAULT_TOP_K),
        Some(k) if (1..=MAX_TOP_K).contains(&k) => Ok(k),
        Some(k) => Err(AppError::Validation(format!(
            "top_k must be between 1 and {MAX_TOP_K}, got {k}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> ExperienceFields {
        ExperienceFields {
            company_name: "Acme".to_string(),
            title: "Backend Engineer".to_string(),
            location: Some("Berlin".to_string()),
            start_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            end_date: None,
            is_current: true,
            description: "Built distributed queues in Rust".to_string(),
        }
    }

    #[test]
    fn test_content_for_embedding_joins_fields() {
        assert_eq!(
            fields().content_for_embedding(),
            "Acme Backend Engineer Berlin Built distributed queues in Rust"
        );
    }

    #[test]
    fn test_content_for_embedding_without_location_keeps_slot() {
        assert_eq!(
            content_for_embedding("Acme", "SRE", None, "On call"),
            "Acme SRE  On call"
        );
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let patched = fields().apply(UpdateExperienceRequest {
            title: Some("Staff Engineer".to_string()),
            ..Default::default()
        });
        assert_eq!(patched.title, "Staff Engineer");
        assert_eq!(patched.company_name, "Acme");
        assert_eq!(patched.location.as_deref(), Some("Berlin"));
        assert!(patched.content_for_embedding().contains("Staff Engineer"));
    }

    #[test]
    fn test_blank_required_field_rejected() {
        let mut f = fields();
        f.description = "   ".to_string();
        assert!(matches!(f.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut f = fields();
        f.end_date = NaiveDate::from_ymd_opt(2020, 1, 1);
        assert!(f.validate().is_err());

        f.end_date = NaiveDate::from_ymd_opt(2022, 1, 1);
        assert!(f.validate().is_ok());
    }

    #[test]
    fn test_top_k_defaults() {
        assert_eq!(resolve_top_k(None).unwrap(), DEFAULT_TOP_K);
    }

    #[test]
    fn test_top_k_bounds() {
        assert_eq!(resolve_top_k(Some(1)).unwrap(), 1);
        assert_eq!(resolve_top_k(Some(MAX_TOP_K)).unwrap(), MAX_TOP_K);
        assert!(resolve_top_k(Some(0)).is_err());
        assert!(resolve_top_k(Some(MAX_TOP_K + 1)).is_err());
    }
}
