use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Default request body limit: 20 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: String,
    pub openai_model: Option<String>,
    pub openai_base_url: Option<String>,
    /// `None` when `TASK_TIMEOUT_SECS=0`
    pub task_timeout: Option<Duration>,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup (the environment, or a map in tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let task_timeout_secs: u64 = lookup("TASK_TIMEOUT_SECS")
            .unwrap_or_else(|| "120".to_string())
            .parse()
            .context("TASK_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Self {
            port: lookup("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: lookup("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_model: lookup("OPENAI_MODEL").filter(|m| !m.trim().is_empty()),
            openai_base_url: lookup("OPENAI_BASE_URL").filter(|u| !u.trim().is_empty()),
            task_timeout: (task_timeout_secs > 0).then(|| Duration::from_secs(task_timeout_secs)),
            max_upload_bytes: match lookup("MAX_UPLOAD_BYTES") {
                Some(raw) => raw.parse().context("MAX_UPLOAD_BYTES must be a valid number")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }
}
