use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use yahoo_client::{YahooConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

/// Server configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory the front-end is served from.
    pub static_dir: PathBuf,
    pub yahoo: YahooConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match var("PORT") {
            Some(v) => v.parse().with_context(|| format!("PORT must be a port number, got {v:?}"))?,
            None => 8000,
        };

        let timeout_secs: u64 = match var("YAHOO_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("YAHOO_TIMEOUT_SECS must be whole seconds, got {v:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let yahoo = YahooConfig {
            base_url: var("YAHOO_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            user_agent: var("YAHOO_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            static_dir: PathBuf::from(var("STATIC_DIR").unwrap_or_else(|| "frontend".to_string())),
            yahoo,
        })
    }
}
