// config.rs
use std::env;
use std::fmt;

use crate::errors::{AppError, Result};

#[derive(Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    pub log_level: tracing::Level,
}

// Token stays out of log output
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment, reading a `.env`
    /// file first when one exists.
    ///
    /// Variables:
    /// - `LEAGUE_API_URL` (required)
    /// - `LEAGUE_API_TOKEN` (optional bearer token)
    /// - `LEAGUE_API_TIMEOUT_SECS` (default: 30)
    /// - `LOG_LEVEL` (default: `info`)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("LEAGUE_API_URL")
            .map_err(|_| AppError::configuration("LEAGUE_API_URL must be set"))?;

        let api_token = env::var("LEAGUE_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let timeout_secs = match env::var("LEAGUE_API_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                AppError::configuration(format!(
                    "LEAGUE_API_TIMEOUT_SECS must be a number, got '{}'",
                    raw
                ))
            })?,
            Err(_) => 30,
        };

        let log_level = match env::var("LOG_LEVEL") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| AppError::configuration(format!("Unknown LOG_LEVEL '{}'", raw)))?,
            Err(_) => tracing::Level::INFO,
        };

        Self::new(api_base_url, api_token, timeout_secs, log_level)
    }

    pub fn new(
        api_base_url: impl Into<String>,
        api_token: Option<String>,
        timeout_secs: u64,
        log_level: tracing::Level,
    ) -> Result<Self> {
        let api_base_url = api_base_url.into();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(AppError::configuration(format!(
                "LEAGUE_API_URL must be an http(s) URL, got '{}'",
                api_base_url
            )));
        }
        if timeout_secs == 0 {
            return Err(AppError::configuration("Request timeout must be positive"));
        }

        Ok(AppConfig {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_token,
            timeout_secs,
            log_level,
        })
    }

    /// Full URL of an endpoint path such as `/cambios-partido`.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}
