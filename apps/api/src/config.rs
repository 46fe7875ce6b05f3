use anyhow::{bail, Context, Result};

/// Number of stored matches kept per project request unless `MATCH_LIMIT` overrides it.
pub const DEFAULT_MATCH_LIMIT: usize = 10;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// JSON file with customer and industry synonym maps. Empty lexicon when unset.
    pub search_lexicon_path: Option<String>,
    pub match_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            search_lexicon_path: std::env::var("SEARCH_LEXICON_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            match_limit: parse_match_limit(std::env::var("MATCH_LIMIT").ok().as_deref())?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// `MATCH_LIMIT` must be at least 1; unset means `DEFAULT_MATCH_LIMIT`.
fn parse_match_limit(raw: Option<&str>) -> Result<usize> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_MATCH_LIMIT);
    };
    let limit = raw
        .trim()
        .parse::<usize>()
        .context("MATCH_LIMIT must be a positive integer")?;
    if limit == 0 {
        bail!("MATCH_LIMIT must be a positive integer, got 0");
    }
    Ok(limit)
}
