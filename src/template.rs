//! Print templates: report documents stored in a template record.
//!
//! A template record carries the report in its `config` field, either as a
//! JSON object or as a JSON-encoded string. Other modules print a real record
//! by rendering the template's preview against that record as external data,
//! with no network activity.

#[cfg(test)]
#[path = "template_test.rs"]
mod template_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::canvas::CanvasView;
use crate::error::ErrorCode;
use crate::http::FetchError;
use crate::model::{ModelError, ReportConfig};
use crate::preview::Preview;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template {code} has no report config")]
    Missing { code: String },
    #[error("template {code} has a malformed report config: {message}")]
    Malformed { code: String, message: String },
    #[error("template {code} is invalid: {source}")]
    Invalid { code: String, source: ModelError },
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ErrorCode for TemplateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "E_TEMPLATE_MISSING",
            Self::Malformed { .. } => "E_TEMPLATE_MALFORMED",
            Self::Invalid { .. } => "E_TEMPLATE_INVALID",
            Self::Fetch(e) => e.error_code(),
        }
    }
}

/// A report template record as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub uuid: String,
    pub code: String,
    pub name: String,
    /// Which business document this template prints (e.g. `work_order`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    /// The report document, as an object or a JSON string.
    #[serde(default)]
    pub config: Option<Value>,
}

/// Loads template records.
#[async_trait::async_trait]
pub trait TemplateStore: Send + Sync {
    /// Load the template with `uuid`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the record cannot be retrieved.
    async fn load(&self, uuid: &str) -> Result<TemplateRecord, FetchError>;
}

/// Extract the report document from a template record.
///
/// # Errors
///
/// Returns `Missing` when the record has no usable config, `Malformed` when
/// it is not valid report JSON, and `Invalid` when the document breaks the
/// model invariants.
pub fn parse_template_config(record: &TemplateRecord) -> Result<ReportConfig, TemplateError> {
    let code = record.code.clone();
    let parsed = match &record.config {
        None | Some(Value::Null) => return Err(TemplateError::Missing { code }),
        Some(Value::String(raw)) if raw.trim().is_empty() => return Err(TemplateError::Missing { code }),
        Some(Value::String(raw)) => serde_json::from_str::<ReportConfig>(raw),
        Some(value) => serde_json::from_value::<ReportConfig>(value.clone()),
    };
    let config = parsed.map_err(|e| {
        warn!(template = %record.code, error = %e, "template config is not valid report JSON");
        TemplateError::Malformed { code: record.code.clone(), message: e.to_string() }
    })?;
    config
        .validate()
        .map_err(|source| TemplateError::Invalid { code: record.code.clone(), source })?;
    Ok(config)
}

/// Render `record` against a literal data record for printing.
///
/// # Errors
///
/// Returns a [`TemplateError`] when the template has no usable config; no
/// render is attempted in that case.
pub fn render_print(record: &TemplateRecord, data: Value) -> Result<CanvasView, TemplateError> {
    let config = parse_template_config(record)?;
    Ok(Preview::with_external_data(data).render(&config).canvas)
}

/// Load a template from `store` and render it against `data`.
///
/// # Errors
///
/// Returns `Fetch` if the record cannot be loaded, otherwise as
/// [`render_print`].
pub async fn load_and_render(store: &dyn TemplateStore, uuid: &str, data: Value) -> Result<CanvasView, TemplateError> {
    let record = store.load(uuid).await?;
    render_print(&record, data)
}
