//! Environment-driven configuration

use anyhow::{anyhow, Result};

/// Runtime configuration for the ordering service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API key for the LLM extractor endpoint.
    pub llm_api_key: String,
    /// Chat model name; a provider default applies when unset.
    pub llm_model: Option<String>,
    /// Catalog database URL (used with the `database` feature).
    pub database_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `LLM_API_KEY` is required; `LLM_MODEL` and `DATABASE_URL` are
    /// optional.
    pub fn from_env() -> Result<Self> {
        let llm_api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| anyhow!("LLM_API_KEY environment variable not set"))?;
        Ok(Self {
            llm_api_key,
            llm_model: std::env::var("LLM_MODEL").ok(),
            database_url: std::env::var("DATABASE_URL").ok(),
        })
    }
}
