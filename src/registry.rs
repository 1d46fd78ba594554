//! Renderer registry: maps a component's type tag to the function that draws it.
//!
//! Rendering produces a toolkit-neutral [`RenderNode`]; the host turns nodes
//! into widgets. The registry is a closed switch over [`ComponentKind`] and is
//! total: `group` and any unrecognized tag render a fallback label.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::context::{ResolvedData, value_number, value_text};
use crate::model::{ChartType, Component, ComponentKind, TextType};

/// A rendering function for one component kind.
pub type RenderFn = fn(&Component, &ResolvedData<'_>) -> RenderNode;

/// Visual output for one component, before placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum RenderNode {
    Table {
        columns: Vec<TableColumn>,
        rows: Vec<Vec<String>>,
        /// Rows per page when pagination is configured.
        page_size: Option<u64>,
    },
    Chart {
        chart_type: ChartType,
        points: Vec<ChartPoint>,
    },
    Text {
        text_type: TextType,
        /// Heading level; only set for titles.
        level: Option<u8>,
        text: String,
    },
    Image {
        src: String,
        alt: String,
    },
    /// An embedded system/core/business configuration panel.
    ConfigPanel { kind: String },
    /// Raw type name for kinds with no renderer.
    Fallback { label: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub title: String,
    pub data_index: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Resolve the renderer for a type tag.
#[must_use]
pub fn renderer_for(kind: &ComponentKind) -> RenderFn {
    match kind {
        ComponentKind::Table => render_table,
        ComponentKind::Chart => render_chart,
        ComponentKind::Text => render_text,
        ComponentKind::Image => render_image,
        ComponentKind::SystemConfig | ComponentKind::CoreConfig | ComponentKind::BusinessConfig => {
            render_config_panel
        }
        ComponentKind::Group | ComponentKind::Other(_) => render_fallback,
    }
}

/// Render one component with its resolved data.
#[must_use]
pub fn render(component: &Component, data: &ResolvedData<'_>) -> RenderNode {
    renderer_for(&component.kind)(component, data)
}

// =============================================================================
// RENDERERS
// =============================================================================

fn render_table(component: &Component, data: &ResolvedData<'_>) -> RenderNode {
    let rows = data.rows();
    let columns = table_columns(component, rows);
    let cells = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| row.get(&col.data_index).map(value_text).unwrap_or_default())
                .collect()
        })
        .collect();
    let page_size = component
        .field("pagination")
        .and_then(|p| p.get("pageSize"))
        .and_then(Value::as_u64);
    RenderNode::Table { columns, rows: cells, page_size }
}

/// Columns from the component's `columns` field, or the first row's keys.
///
/// Entries may be plain strings (key and title) or `{title, dataIndex}`
/// objects; `key` is accepted in place of `dataIndex`.
fn table_columns(component: &Component, rows: &[Value]) -> Vec<TableColumn> {
    if let Some(Value::Array(defs)) = component.field("columns") {
        let cols: Vec<TableColumn> = defs
            .iter()
            .filter_map(|def| match def {
                Value::String(key) => Some(TableColumn { title: key.clone(), data_index: key.clone() }),
                Value::Object(obj) => {
                    let index = obj
                        .get("dataIndex")
                        .or_else(|| obj.get("key"))
                        .and_then(Value::as_str)?;
                    let title = obj.get("title").and_then(Value::as_str).unwrap_or(index);
                    Some(TableColumn { title: title.to_owned(), data_index: index.to_owned() })
                }
                _ => None,
            })
            .collect();
        if !cols.is_empty() {
            return cols;
        }
    }
    rows.first()
        .and_then(Value::as_object)
        .map(|obj| {
            obj.keys()
                .map(|k| TableColumn { title: k.clone(), data_index: k.clone() })
                .collect()
        })
        .unwrap_or_default()
}

fn render_chart(component: &Component, data: &ResolvedData<'_>) -> RenderNode {
    let cfg = component.chart_config();
    let field = |key: &str, default: &'static str| {
        cfg.and_then(|c| c.get(key))
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_owned()
    };
    let x_field = field("xField", "x");
    let y_field = field("yField", "y");

    let points = data
        .rows()
        .iter()
        .filter_map(|row| {
            let label = row.get(&x_field).map(value_text)?;
            let value = row
                .get(&y_field)
                .or_else(|| row.get("value"))
                .and_then(value_number)?;
            Some(ChartPoint { label, value })
        })
        .collect();
    RenderNode::Chart { chart_type: component.chart_type(), points }
}

fn render_text(component: &Component, data: &ResolvedData<'_>) -> RenderNode {
    let text_type = component.text_type();
    let level = (text_type == TextType::Title).then(|| component.level());
    RenderNode::Text { text_type, level, text: data.interpolate(component.content()) }
}

fn render_image(component: &Component, data: &ResolvedData<'_>) -> RenderNode {
    RenderNode::Image { src: data.interpolate(component.src()), alt: data.interpolate(component.alt()) }
}

fn render_config_panel(component: &Component, _data: &ResolvedData<'_>) -> RenderNode {
    RenderNode::ConfigPanel { kind: component.kind.as_str().to_owned() }
}

fn render_fallback(component: &Component, _data: &ResolvedData<'_>) -> RenderNode {
    RenderNode::Fallback { label: component.kind.as_str().to_owned() }
}

// =============================================================================
// TEXT OUTPUT
// =============================================================================

impl fmt::Display for RenderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table { columns, rows, .. } => {
                let header: Vec<&str> = columns.iter().map(|c| c.title.as_str()).collect();
                write!(f, "| {} |", header.join(" | "))?;
                for row in rows {
                    write!(f, "\n| {} |", row.join(" | "))?;
                }
                Ok(())
            }
            Self::Chart { chart_type, points } => {
                write!(f, "[{} chart]", chart_type.as_str())?;
                for p in points {
                    write!(f, " {}={}", p.label, p.value)?;
                }
                Ok(())
            }
            Self::Text { level: Some(level), text, .. } => {
                write!(f, "{} {text}", "#".repeat(usize::from(*level)))
            }
            Self::Text { text, .. } => f.write_str(text),
            Self::Image { src, alt } => write!(f, "![{alt}]({src})"),
            Self::ConfigPanel { kind } => write!(f, "[{kind} panel]"),
            Self::Fallback { label } => f.write_str(label),
        }
    }
}
