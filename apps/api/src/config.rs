use anyhow::{Context, Result};

const DEFAULT_EMBEDDING_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub jwt_secret: String,
    /// When unset the service falls back to the local hashing embedder.
    pub embedding_api_key: Option<String>,
    pub embedding_api_url: String,
    pub embedding_model: String,
    /// When unset, company research is disabled.
    pub serpapi_api_key: Option<String>,
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            jwt_secret: require_env("JWT_SECRET")?,
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_api_url: optional_env("EMBEDDING_API_URL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_API_URL.to_string()),
            embedding_model: optional_env("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            serpapi_api_key: optional_env("SERPAPI_API_KEY"),
            cors_origins: optional_env("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
            port: parse_port(std::env::var("PORT").ok().as_deref())?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Blank values count as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_port(raw: Option<&str>) -> Result<u16> {
    raw.unwrap_or("8080")
        .parse::<u16>()
        .context("PORT must be a valid port number")
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_defaults_to_8080() {
        assert_eq!(parse_port(None).unwrap(), 8080);
    }

    #[test]
    fn test_port_rejects_garbage() {
        assert!(parse_port(Some("eighty")).is_err());
        assert!(parse_port(Some("70000")).is_err());
    }

    #[test]
    fn test_origins_split_and_trimmed() {
        let origins = parse_origins(" http://localhost:3000 , https://app.coverly.dev,, ");
        assert_eq!(
            origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://app.coverly.dev".to_string()
            ]
        );
    }
}
