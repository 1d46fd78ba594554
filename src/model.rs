//! Document model: the persisted report configuration and its components.
//!
//! This module defines what is saved (`ReportConfig`), the placeable unit
//! (`Component`) with its closed set of type tags (`ComponentKind`), typed
//! accessors over the open per-type field bag, and the id sequence used when
//! components are created.
//!
//! Everything here round-trips through JSON without loss: unknown top-level
//! keys, unknown component fields and unknown type tags are all preserved so
//! that a document written by a newer schema survives a load/save cycle.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::collections::HashSet;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::consts::{COMPONENT_ID_PREFIX, CONFIG_VERSION};
use crate::error::ErrorCode;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("duplicate component id: {0}")]
    DuplicateId(String),
    #[error("component not found: {0}")]
    NotFound(String),
    #[error("component {id}: position must be finite and >= 0, got ({x}, {y})")]
    NegativePosition { id: String, x: f64, y: f64 },
    #[error("component {id}: size must be > 0, got {width}x{height}")]
    NonPositiveSize { id: String, width: f64, height: f64 },
    #[error("invalid report json: {0}")]
    Json(#[from] serde_json::Error),
}

impl ErrorCode for ModelError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateId(_) => "E_DUPLICATE_ID",
            Self::NotFound(_) => "E_COMPONENT_NOT_FOUND",
            Self::NegativePosition { .. } => "E_NEGATIVE_POSITION",
            Self::NonPositiveSize { .. } => "E_NON_POSITIVE_SIZE",
            Self::Json(_) => "E_REPORT_JSON",
        }
    }
}

// =============================================================================
// COMPONENT KIND
// =============================================================================

/// Type tag of a component.
///
/// Serialized as its kebab-case tag. Tags this version does not know are kept
/// verbatim in [`ComponentKind::Other`] so they survive a round-trip and render
/// through the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Table,
    Chart,
    Text,
    Image,
    /// Reserved; no nesting semantics.
    Group,
    SystemConfig,
    CoreConfig,
    BusinessConfig,
    /// A tag outside the known set.
    Other(String),
}

impl ComponentKind {
    /// Every tag the palette can create, in palette order.
    #[must_use]
    pub fn known() -> [Self; 8] {
        [
            Self::Table,
            Self::Chart,
            Self::Text,
            Self::Image,
            Self::Group,
            Self::SystemConfig,
            Self::CoreConfig,
            Self::BusinessConfig,
        ]
    }

    /// Parse a stored tag. Never fails.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag {
            "table" => Self::Table,
            "chart" => Self::Chart,
            "text" => Self::Text,
            "image" => Self::Image,
            "group" => Self::Group,
            "system-config" => Self::SystemConfig,
            "core-config" => Self::CoreConfig,
            "business-config" => Self::BusinessConfig,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Table => "table",
            Self::Chart => "chart",
            Self::Text => "text",
            Self::Image => "image",
            Self::Group => "group",
            Self::SystemConfig => "system-config",
            Self::CoreConfig => "core-config",
            Self::BusinessConfig => "business-config",
            Self::Other(tag) => tag,
        }
    }

    /// Embedded configuration panels (system/core/business).
    #[must_use]
    pub fn is_config_panel(&self) -> bool {
        matches!(self, Self::SystemConfig | Self::CoreConfig | Self::BusinessConfig)
    }

    /// Kinds that consume a bound data-source array.
    #[must_use]
    pub fn is_data_bound(&self) -> bool {
        matches!(self, Self::Table | Self::Chart)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ComponentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ComponentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::parse(&tag))
    }
}

// =============================================================================
// TYPE-SPECIFIC ENUMS
// =============================================================================

/// Chart variant selected in the property panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Column,
    Line,
    Pie,
    Scatter,
}

impl ChartType {
    pub const ALL: [Self; 4] = [Self::Column, Self::Line, Self::Pie, Self::Scatter];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Line => "line",
            Self::Pie => "pie",
            Self::Scatter => "scatter",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

/// Text variant selected in the property panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextType {
    Title,
    #[default]
    Paragraph,
    Label,
}

impl TextType {
    pub const ALL: [Self; 3] = [Self::Title, Self::Paragraph, Self::Label];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Paragraph => "paragraph",
            Self::Label => "label",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

/// How a table or chart obtains its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// A named data source picked from the catalog.
    DataSource,
    /// A URL fetched with a plain GET.
    Api,
    /// A binding type this version does not load.
    Unknown,
}

impl BindingKind {
    pub const EDITABLE: [Self; 2] = [Self::DataSource, Self::Api];

    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "datasource" => Self::DataSource,
            "api" => Self::Api,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DataSource => "datasource",
            Self::Api => "api",
            Self::Unknown => "unknown",
        }
    }
}

/// A data-source binding as read from a component or from `dataSources`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceBinding {
    /// Key under which the loaded data is stored in the preview context.
    pub code: Option<String>,
    pub kind: BindingKind,
    pub url: Option<String>,
}

impl DataSourceBinding {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .map_or(BindingKind::DataSource, BindingKind::parse);
        Some(Self { code: text("code"), kind, url: text("url") })
    }
}

// =============================================================================
// COMPONENT
// =============================================================================

/// One placeable, absolutely positioned element on the report canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Unique within the owning [`ReportConfig`].
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    /// Left edge in canvas pixels.
    pub x: f64,
    /// Top edge in canvas pixels.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Presentation overrides merged onto the rendered wrapper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,
    /// Type-specific fields (`content`, `chartType`, `dataSource`, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Component {
    /// Create a component with no type-specific fields.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ComponentKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { id: id.into(), kind, x, y, width, height, style: None, fields: Map::new() }
    }

    /// Check the geometry bounds: position `>= 0`, size `> 0`.
    ///
    /// # Errors
    ///
    /// Returns `NegativePosition` or `NonPositiveSize`.
    pub fn check_geometry(&self) -> Result<(), ModelError> {
        // Written as negated comparisons so NaN is rejected too.
        if !(self.x >= 0.0 && self.y >= 0.0) || !self.x.is_finite() || !self.y.is_finite() {
            return Err(ModelError::NegativePosition { id: self.id.clone(), x: self.x, y: self.y });
        }
        if !(self.width > 0.0 && self.height > 0.0) || !self.width.is_finite() || !self.height.is_finite() {
            return Err(ModelError::NonPositiveSize { id: self.id.clone(), width: self.width, height: self.height });
        }
        Ok(())
    }

    /// Return `{...self, ...patch}`. The `id` key in `patch` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `Json` if a patched well-known field has the wrong JSON type
    /// (e.g. a string `x`).
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<Self, ModelError> {
        let mut value = serde_json::to_value(self)?;
        if let Some(obj) = value.as_object_mut() {
            for (key, v) in patch {
                if key == "id" {
                    continue;
                }
                obj.insert(key.clone(), v.clone());
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Look up a type-specific field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Text body; may contain `{{path}}` placeholders. Empty when absent.
    #[must_use]
    pub fn content(&self) -> &str {
        self.field_str("content").unwrap_or("")
    }

    /// Defaults to `paragraph` when absent or unrecognized.
    #[must_use]
    pub fn text_type(&self) -> TextType {
        self.field_str("textType")
            .and_then(TextType::parse)
            .unwrap_or_default()
    }

    /// Heading level for title text, clamped to `1..=6`. Defaults to `1`.
    ///
    /// Integral floats such as `2.0` are accepted.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn level(&self) -> u8 {
        let raw = self
            .fields
            .get("level")
            .and_then(Value::as_f64)
            .filter(|n| n.fract() == 0.0)
            .map_or(1.0, |n| n.clamp(1.0, 6.0));
        raw as u8
    }

    /// Defaults to `column` when absent or unrecognized.
    #[must_use]
    pub fn chart_type(&self) -> ChartType {
        self.field_str("chartType")
            .and_then(ChartType::parse)
            .unwrap_or_default()
    }

    /// Free-form chart options (`xField`, `yField`, ...).
    #[must_use]
    pub fn chart_config(&self) -> Option<&Map<String, Value>> {
        self.fields.get("chartConfig").and_then(Value::as_object)
    }

    #[must_use]
    pub fn src(&self) -> &str {
        self.field_str("src").unwrap_or("")
    }

    #[must_use]
    pub fn alt(&self) -> &str {
        self.field_str("alt").unwrap_or("")
    }

    /// Data-source binding for table/chart components, if any.
    #[must_use]
    pub fn binding(&self) -> Option<DataSourceBinding> {
        self.fields.get("dataSource").and_then(DataSourceBinding::from_value)
    }
}

// =============================================================================
// REPORT CONFIG
// =============================================================================

/// The persisted report document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub layout: Map<String, Value>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_sources: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Value>,
    /// Top-level keys this version does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_version() -> String {
    CONFIG_VERSION.to_owned()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            layout: Map::new(),
            components: Vec::new(),
            data_sources: None,
            styles: None,
            extra: Map::new(),
        }
    }
}

impl ReportConfig {
    /// Create an empty document at the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns `Json` on malformed input.
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns `Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check id uniqueness and every component's geometry.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, in component order.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::new();
        for c in &self.components {
            if !seen.insert(c.id.as_str()) {
                return Err(ModelError::DuplicateId(c.id.clone()));
            }
            c.check_geometry()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Data sources the preview should load, keyed by code.
    ///
    /// `dataSources` may be an array of `{code, type, url}` objects or an
    /// object mapping code to `{type, url}`. Component bindings of type `api`
    /// that carry both a code and a URL are appended; a declaration in
    /// `dataSources` wins over a component binding with the same code.
    #[must_use]
    pub fn declared_sources(&self) -> Vec<DataSourceBinding> {
        let mut out: Vec<DataSourceBinding> = Vec::new();
        match &self.data_sources {
            Some(Value::Array(items)) => {
                out.extend(items.iter().filter_map(DataSourceBinding::from_value));
            }
            Some(Value::Object(map)) => {
                for (code, decl) in map {
                    if let Some(mut binding) = DataSourceBinding::from_value(decl) {
                        binding.code.get_or_insert_with(|| code.clone());
                        out.push(binding);
                    }
                }
            }
            _ => {}
        }
        out.retain(|b| b.code.is_some());

        for binding in self.components.iter().filter_map(Component::binding) {
            if binding.kind != BindingKind::Api || binding.url.is_none() {
                continue;
            }
            let Some(code) = binding.code.as_deref() else {
                continue;
            };
            if out.iter().any(|b| b.code.as_deref() == Some(code)) {
                continue;
            }
            out.push(binding);
        }
        out
    }
}

// =============================================================================
// ID SEQUENCE
// =============================================================================

/// Monotonic, time-based component id generator (`comp_<millis>_<seq>`).
///
/// Within one millisecond the sequence number disambiguates; across
/// milliseconds the timestamp never goes backwards, even if the wall clock
/// does.
#[derive(Debug, Default)]
pub struct IdGen {
    last_ms: u64,
    seq: u32,
}

impl IdGen {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id in the sequence.
    pub fn next_id(&mut self) -> String {
        let now = now_ms().max(self.last_ms);
        if now == self.last_ms {
            self.seq += 1;
        } else {
            self.last_ms = now;
            self.seq = 0;
        }
        format!("{COMPONENT_ID_PREFIX}_{}_{}", self.last_ms, self.seq)
    }
}

fn now_ms() -> u64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
}
