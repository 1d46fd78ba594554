//! Designer configuration parsed from environment variables.

use crate::consts::{DEFAULT_API_BASE_URL, DEFAULT_CATALOG_PAGE_SIZE, DEFAULT_CONNECT_TIMEOUT_SECS};
use crate::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidNumber { .. } => "E_CONFIG_PARSE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignerConfig {
    /// REST API base URL, without a trailing slash.
    pub api_base_url: String,
    /// Page size for the one-shot catalog fetch.
    pub catalog_page_size: u32,
    /// Whole-request timeout. `None` leaves the transport default in place.
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: u64,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            catalog_page_size: DEFAULT_CATALOG_PAGE_SIZE,
            request_timeout_secs: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl DesignerConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `REPORT_API_BASE_URL`: default `http://127.0.0.1:8000/api/v1`
    /// - `REPORT_CATALOG_PAGE_SIZE`: default 100
    /// - `REPORT_REQUEST_TIMEOUT_SECS`: unset means no timeout
    /// - `REPORT_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumber` when a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = std::env::var("REPORT_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned());
        Ok(Self {
            api_base_url: normalize_base_url(&base),
            catalog_page_size: env_parse("REPORT_CATALOG_PAGE_SIZE")?.unwrap_or(DEFAULT_CATALOG_PAGE_SIZE),
            request_timeout_secs: env_parse("REPORT_REQUEST_TIMEOUT_SECS")?,
            connect_timeout_secs: env_parse("REPORT_CONNECT_TIMEOUT_SECS")?.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        })
    }

    /// Replace the base URL (e.g. from a CLI flag).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.api_base_url = normalize_base_url(base_url);
        self
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn env_parse<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    let Ok(raw) = std::env::var(var) else {
        return Ok(None);
    };
    let parsed = raw.trim().parse::<T>();
    parsed
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber { var, value: raw })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
