use std::path::PathBuf;

use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_LOG_FILE: &str = "todolist.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the todo store; the `todos/` routes hang off it.
    pub api_url: Url,
    pub log_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default api url is valid"),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl ClientConfig {
    /// Reads `TODO_API_URL` and `TODO_LOG_FILE`, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup("TODO_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = parse_api_url(&raw)?;
        }
        if let Some(path) = lookup("TODO_LOG_FILE").filter(|v| !v.trim().is_empty()) {
            config.log_file = PathBuf::from(path);
        }
        Ok(config)
    }
}

fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("TODO_API_URL `{raw}` is not a valid URL"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => anyhow::bail!("TODO_API_URL must use http or https, got `{other}`"),
    }
}
