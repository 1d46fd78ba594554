//! REST collaborators over `reqwest`.
//!
//! Thin HTTP wrappers for the backend resources the designer consumes: plain
//! GETs for preview data sources, the paginated data-source catalog, and the
//! report template resource (load and save). No retries; a failed call is
//! returned to the caller, who logs it and degrades.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::config::DesignerConfig;
use crate::designer::{SaveError, SaveSink};
use crate::error::ErrorCode;
use crate::model::ReportConfig;
use crate::panel::{CatalogPage, DataSourceCatalog};
use crate::preview::DataFetcher;
use crate::template::{TemplateRecord, TemplateStore};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by network collaborators.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The body was not the expected JSON shape.
    #[error("response from {url} could not be parsed: {message}")]
    Parse { url: String, message: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ErrorCode for FetchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request { .. } => "E_FETCH_REQUEST",
            Self::Status { .. } => "E_FETCH_STATUS",
            Self::Parse { .. } => "E_FETCH_PARSE",
            Self::ClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request { .. } | Self::Status { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP adapter for every backend collaborator.
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Build a client from the designer configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientBuild` if the TLS backend cannot be initialized.
    pub fn new(config: &DesignerConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.api_base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs pass through; paths starting with `/` are joined onto the
    /// base URL.
    #[must_use]
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with('/') { format!("{}{url}", self.base_url) } else { url.to_owned() }
    }

    async fn send_json(&self, request: reqwest::RequestBuilder, url: &str) -> Result<Value, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Request { url: url.to_owned(), message: e.to_string() })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Request { url: url.to_owned(), message: e.to_string() })?;

        if !(200..300).contains(&status) {
            return Err(FetchError::Status { url: url.to_owned(), status });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| FetchError::Parse { url: url.to_owned(), message: e.to_string() })
    }

    fn template_url(&self, uuid: &str) -> String {
        format!("{}/core/print-templates/{uuid}", self.base_url)
    }

    /// Bind this client to one template so it can act as a [`SaveSink`].
    #[must_use]
    pub fn template_sink(&self, uuid: impl Into<String>) -> TemplateSink<'_> {
        TemplateSink { client: self, uuid: uuid.into() }
    }
}

fn parse_as<T: serde::de::DeserializeOwned>(value: Value, url: &str) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|e| FetchError::Parse { url: url.to_owned(), message: e.to_string() })
}

#[async_trait::async_trait]
impl DataFetcher for HttpClient {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let url = self.resolve_url(url);
        debug!(%url, "fetching data source");
        self.send_json(self.http.get(&url), &url).await
    }
}

#[async_trait::async_trait]
impl DataSourceCatalog for HttpClient {
    async fn list(&self, page: u32, page_size: u32) -> Result<CatalogPage, FetchError> {
        let url = format!("{}/core/data-sources?page={page}&page_size={page_size}", self.base_url);
        let body = self.send_json(self.http.get(&url), &url).await?;
        parse_as(body, &url)
    }
}

#[async_trait::async_trait]
impl TemplateStore for HttpClient {
    async fn load(&self, uuid: &str) -> Result<TemplateRecord, FetchError> {
        let url = self.template_url(uuid);
        let body = self.send_json(self.http.get(&url), &url).await?;
        parse_as(body, &url)
    }
}

/// Saves a report into the `config` field of one template record.
pub struct TemplateSink<'a> {
    client: &'a HttpClient,
    uuid: String,
}

#[async_trait::async_trait]
impl SaveSink for TemplateSink<'_> {
    async fn save(&self, config: &ReportConfig) -> Result<(), SaveError> {
        let url = self.client.template_url(&self.uuid);
        let body = json!({ "config": config });
        self.client
            .send_json(self.client.http.put(&url).json(&body), &url)
            .await?;
        Ok(())
    }
}
