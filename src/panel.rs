//! Property panel: the type-conditional form for the selected component.
//!
//! ARCHITECTURE
//! ============
//! The panel never mutates the document. `view` describes the form for the
//! current selection, and `edit` turns one field change into the merged
//! component `{...selected, ...changed}` which the designer shell writes back
//! by id. The data-source catalog is fetched once at mount; a failed fetch
//! leaves it empty and editing carries on.

#[cfg(test)]
#[path = "panel_test.rs"]
mod panel_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::context::value_number;
use crate::error::ErrorCode;
use crate::http::FetchError;
use crate::model::{BindingKind, ChartType, Component, ComponentKind, ModelError, TextType};

// =============================================================================
// CATALOG
// =============================================================================

/// One entry of the data-source catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub uuid: String,
    pub code: String,
    pub name: String,
}

/// One page of the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub items: Vec<CatalogEntry>,
    pub total: u64,
}

/// Paginated listing of available data sources.
#[async_trait::async_trait]
pub trait DataSourceCatalog: Send + Sync {
    /// Fetch one page (1-based).
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the listing cannot be retrieved.
    async fn list(&self, page: u32, page_size: u32) -> Result<CatalogPage, FetchError>;
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("field `{key}` is not editable for this component")]
    NotEditable { key: String },
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ErrorCode for PanelError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotEditable { .. } => "E_FIELD_NOT_EDITABLE",
            Self::InvalidValue { .. } => "E_INVALID_FIELD_VALUE",
            Self::Model(e) => e.error_code(),
        }
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> PanelError {
    PanelError::InvalidValue { key: key.to_owned(), reason: reason.into() }
}

// =============================================================================
// FORM DESCRIPTION
// =============================================================================

/// Input widget for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum FieldInput {
    Number { min: Option<f64>, max: Option<f64> },
    Text,
    TextArea,
    Url,
    Select { options: Vec<SelectOption> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    fn new(value: &str, label: &str) -> Self {
        Self { value: value.to_owned(), label: label.to_owned() }
    }
}

/// One editable field with its current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Patch key; nested binding fields use `dataSource.<name>`.
    pub key: &'static str,
    pub label: &'static str,
    pub input: FieldInput,
    pub value: Value,
}

/// What the panel shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PanelView {
    /// Nothing selected.
    Empty,
    Form { component_id: String, fields: Vec<Field> },
}

impl PanelView {
    /// Look up a field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        match self {
            Self::Empty => None,
            Self::Form { fields, .. } => fields.iter().find(|f| f.key == key),
        }
    }
}

// =============================================================================
// PANEL
// =============================================================================

/// The property panel and its data-source catalog.
#[derive(Debug, Clone, Default)]
pub struct PropertyPanel {
    catalog: Vec<CatalogEntry>,
}

impl PropertyPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Panel with a pre-fetched catalog.
    #[must_use]
    pub fn with_catalog(catalog: Vec<CatalogEntry>) -> Self {
        Self { catalog }
    }

    /// Fetch the first catalog page. Failure is logged and leaves the catalog
    /// empty.
    pub async fn mount(&mut self, source: &dyn DataSourceCatalog, page_size: u32) {
        match source.list(1, page_size).await {
            Ok(page) => {
                info!(count = page.items.len(), total = page.total, "data-source catalog loaded");
                self.catalog = page.items;
            }
            Err(e) => {
                warn!(error = %e, "data-source catalog fetch failed; continuing with empty catalog");
                self.catalog.clear();
            }
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    /// Describe the form for `selected`.
    #[must_use]
    pub fn view(&self, selected: Option<&Component>) -> PanelView {
        let Some(c) = selected else {
            return PanelView::Empty;
        };

        let mut fields = vec![
            number_field("x", "X", json!(c.x), Some(0.0), None),
            number_field("y", "Y", json!(c.y), Some(0.0), None),
            number_field("width", "Width", json!(c.width), None, None),
            number_field("height", "Height", json!(c.height), None, None),
        ];

        if c.kind.is_data_bound() {
            self.binding_fields(c, &mut fields);
        }

        match c.kind {
            ComponentKind::Chart => fields.push(Field {
                key: "chartType",
                label: "Chart type",
                input: FieldInput::Select {
                    options: vec![
                        SelectOption::new(ChartType::Column.as_str(), "Column"),
                        SelectOption::new(ChartType::Line.as_str(), "Line"),
                        SelectOption::new(ChartType::Pie.as_str(), "Pie"),
                        SelectOption::new(ChartType::Scatter.as_str(), "Scatter"),
                    ],
                },
                value: json!(c.chart_type().as_str()),
            }),
            ComponentKind::Text => {
                let text_type = c.text_type();
                fields.push(Field {
                    key: "textType",
                    label: "Text type",
                    input: FieldInput::Select {
                        options: vec![
                            SelectOption::new(TextType::Title.as_str(), "Title"),
                            SelectOption::new(TextType::Paragraph.as_str(), "Paragraph"),
                            SelectOption::new(TextType::Label.as_str(), "Label"),
                        ],
                    },
                    value: json!(text_type.as_str()),
                });
                fields.push(Field { key: "content", label: "Content", input: FieldInput::TextArea, value: json!(c.content()) });
                if text_type == TextType::Title {
                    fields.push(number_field("level", "Heading level", json!(c.level()), Some(1.0), Some(6.0)));
                }
            }
            ComponentKind::Image => {
                fields.push(Field { key: "src", label: "Image URL", input: FieldInput::Url, value: json!(c.src()) });
                fields.push(Field { key: "alt", label: "Description", input: FieldInput::Text, value: json!(c.alt()) });
            }
            _ => {}
        }

        PanelView::Form { component_id: c.id.clone(), fields }
    }

    fn binding_fields(&self, c: &Component, fields: &mut Vec<Field>) {
        let binding = c.binding();
        // An unrecognized stored type is shown, and edited, as a named source.
        let kind = match binding.as_ref().map(|b| b.kind) {
            Some(BindingKind::Api) => BindingKind::Api,
            _ => BindingKind::DataSource,
        };
        fields.push(Field {
            key: "dataSource.type",
            label: "Data source type",
            input: FieldInput::Select {
                options: vec![
                    SelectOption::new(BindingKind::DataSource.as_str(), "Data source"),
                    SelectOption::new(BindingKind::Api.as_str(), "API"),
                ],
            },
            value: json!(kind.as_str()),
        });
        let code = binding.as_ref().and_then(|b| b.code.clone()).unwrap_or_default();
        match kind {
            BindingKind::Api => {
                let url = binding.and_then(|b| b.url).unwrap_or_default();
                fields.push(Field { key: "dataSource.url", label: "API URL", input: FieldInput::Url, value: json!(url) });
                fields.push(Field { key: "dataSource.code", label: "Data key", input: FieldInput::Text, value: json!(code) });
            }
            BindingKind::DataSource | BindingKind::Unknown => {
                let options = self
                    .catalog
                    .iter()
                    .map(|e| SelectOption { value: e.code.clone(), label: e.name.clone() })
                    .collect();
                fields.push(Field {
                    key: "dataSource.code",
                    label: "Data source",
                    input: FieldInput::Select { options },
                    value: json!(code),
                });
            }
        }
    }

    /// Apply one field change to `selected`.
    ///
    /// Returns `Ok(None)` when nothing is selected. Otherwise returns the
    /// merged component for the shell to write back.
    ///
    /// # Errors
    ///
    /// Returns `NotEditable` for keys the current form does not show, and
    /// `InvalidValue` for out-of-range numbers or unknown enum values.
    pub fn edit(&self, selected: Option<&Component>, key: &str, value: Value) -> Result<Option<Component>, PanelError> {
        let Some(c) = selected else {
            return Ok(None);
        };
        let view = self.view(Some(c));
        let Some(field) = view.field(key) else {
            return Err(PanelError::NotEditable { key: key.to_owned() });
        };
        let value = check_value(field, value)?;

        let mut patch = Map::new();
        if let Some(sub) = key.strip_prefix("dataSource.") {
            let mut binding = match c.field("dataSource") {
                Some(Value::Object(existing)) => existing.clone(),
                _ => Map::new(),
            };
            binding.insert(sub.to_owned(), value);
            patch.insert("dataSource".to_owned(), Value::Object(binding));
        } else {
            patch.insert(key.to_owned(), value);
        }

        let merged = c.merged(&patch)?;
        merged.check_geometry()?;
        Ok(Some(merged))
    }
}

fn number_field(key: &'static str, label: &'static str, value: Value, min: Option<f64>, max: Option<f64>) -> Field {
    Field { key, label, input: FieldInput::Number { min, max }, value }
}

/// Validate `value` against the field's input and normalize it.
fn check_value(field: &Field, value: Value) -> Result<Value, PanelError> {
    let key = field.key;
    match &field.input {
        FieldInput::Number { min, max } => {
            let n = value_number(&value).ok_or_else(|| invalid(key, "expected a number"))?;
            if min.is_some_and(|m| n < m) || max.is_some_and(|m| n > m) {
                return Err(invalid(key, format!("{n} is out of range")));
            }
            if key == "level" {
                if n.fract() != 0.0 {
                    return Err(invalid(key, "expected a whole number"));
                }
                #[allow(clippy::cast_possible_truncation)]
                return Ok(json!(n as i64));
            }
            Ok(json!(n))
        }
        FieldInput::Select { options } if key != "dataSource.code" => {
            let Some(raw) = value.as_str() else {
                return Err(invalid(key, "expected a string"));
            };
            if options.iter().any(|o| o.value == raw) {
                Ok(value)
            } else {
                Err(invalid(key, format!("unknown option `{raw}`")))
            }
        }
        // The catalog may be empty after a failed fetch; any code is accepted.
        FieldInput::Select { .. } | FieldInput::Text | FieldInput::TextArea | FieldInput::Url => match value {
            Value::String(_) => Ok(value),
            Value::Null => Ok(json!("")),
            _ => Err(invalid(key, "expected a string")),
        },
    }
}
