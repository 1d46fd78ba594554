//! Canvas: drag sources, drop geometry, and placement of rendered components.
//!
//! The canvas is a pass-through coordinate space. It knows where a
//! component's wrapper goes and how a drop changes geometry, but delegates
//! drawing to the [`crate::registry`]. The designer shell owns the document;
//! the functions here compute the mutations it applies.

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::consts::{
    CANVAS_DROP_ID, CHART_SIZE, CONFIG_PANEL_SIZE, EMPTY_CANVAS_TEXT, FALLBACK_SIZE, IMAGE_SIZE, PALETTE_PREFIX,
    TABLE_SIZE, TEXT_SIZE,
};
use crate::context::ResolvedData;
use crate::model::{Component, ComponentKind, ReportConfig};
use crate::registry::{self, RenderNode};

// =============================================================================
// GEOMETRY
// =============================================================================

/// A point or delta in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Default `(width, height)` for a newly dropped component.
#[must_use]
pub fn default_size(kind: &ComponentKind) -> (f64, f64) {
    match kind {
        ComponentKind::SystemConfig | ComponentKind::CoreConfig | ComponentKind::BusinessConfig => CONFIG_PANEL_SIZE,
        ComponentKind::Table => TABLE_SIZE,
        ComponentKind::Chart => CHART_SIZE,
        ComponentKind::Text => TEXT_SIZE,
        ComponentKind::Image => IMAGE_SIZE,
        ComponentKind::Group | ComponentKind::Other(_) => FALLBACK_SIZE,
    }
}

/// Type-specific fields a freshly created component starts with.
fn default_fields(kind: &ComponentKind) -> Map<String, Value> {
    let value = match kind {
        ComponentKind::Text => json!({ "content": "Text", "textType": "paragraph" }),
        ComponentKind::Chart => json!({ "chartType": "column" }),
        ComponentKind::Table => json!({ "columns": [], "pagination": false }),
        ComponentKind::Image => json!({ "src": "", "alt": "" }),
        _ => json!({}),
    };
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Build the component created by dropping a palette item at `at`.
///
/// The position is clamped into the positive quadrant.
#[must_use]
pub fn new_component(id: String, kind: ComponentKind, at: Point) -> Component {
    let (width, height) = default_size(&kind);
    let mut component = Component::new(id, kind, at.x.max(0.0), at.y.max(0.0), width, height);
    component.fields = default_fields(&component.kind);
    component
}

/// Position after dragging `component` by `delta`, pinned at the origin.
#[must_use]
pub fn moved_position(component: &Component, delta: Point) -> Point {
    Point::new((component.x + delta.x).max(0.0), (component.y + delta.y).max(0.0))
}

// =============================================================================
// DRAG SOURCES
// =============================================================================

/// What a drag id refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    /// A palette item: create a new component of this kind on drop.
    Palette(ComponentKind),
    /// A component already on the canvas.
    Placed(String),
}

impl DragSource {
    /// Classify a drag id by the reserved palette prefix.
    #[must_use]
    pub fn parse(drag_id: &str) -> Self {
        match drag_id.strip_prefix(PALETTE_PREFIX) {
            Some(tag) => Self::Palette(ComponentKind::parse(tag)),
            None => Self::Placed(drag_id.to_owned()),
        }
    }

    /// The drag id for this source.
    #[must_use]
    pub fn drag_id(&self) -> String {
        match self {
            Self::Palette(kind) => palette_id(kind),
            Self::Placed(id) => id.clone(),
        }
    }
}

/// Drag id of the palette item for `kind`.
#[must_use]
pub fn palette_id(kind: &ComponentKind) -> String {
    format!("{PALETTE_PREFIX}{kind}")
}

/// One entry in the component library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteItem {
    pub drag_id: String,
    pub kind: ComponentKind,
    pub label: &'static str,
    pub width: f64,
    pub height: f64,
}

/// The component library, in display order.
#[must_use]
pub fn palette() -> Vec<PaletteItem> {
    ComponentKind::known()
        .into_iter()
        .map(|kind| {
            let (width, height) = default_size(&kind);
            PaletteItem { drag_id: palette_id(&kind), label: palette_label(&kind), kind, width, height }
        })
        .collect()
}

fn palette_label(kind: &ComponentKind) -> &'static str {
    match kind {
        ComponentKind::Table => "Table",
        ComponentKind::Chart => "Chart",
        ComponentKind::Text => "Text",
        ComponentKind::Image => "Image",
        ComponentKind::Group => "Group",
        ComponentKind::SystemConfig => "System configuration",
        ComponentKind::CoreConfig => "Core configuration",
        ComponentKind::BusinessConfig => "Business configuration",
        ComponentKind::Other(_) => "Component",
    }
}

// =============================================================================
// SURFACE
// =============================================================================

/// Presentational state of the drop surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    #[default]
    Idle,
    /// A drag is currently over the canvas.
    Hovering,
}

/// The drop surface.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    surface: Surface,
}

impl Canvas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Track which target the active drag is over.
    pub fn drag_over(&mut self, over: Option<&str>, config: &ReportConfig) {
        self.surface = if is_drop_target(over, config) { Surface::Hovering } else { Surface::Idle };
    }

    /// Drag finished or was cancelled.
    pub fn drag_left(&mut self) {
        self.surface = Surface::Idle;
    }
}

/// Valid drop targets are the canvas itself and any placed component on it.
#[must_use]
pub fn is_drop_target(over: Option<&str>, config: &ReportConfig) -> bool {
    match over {
        Some(CANVAS_DROP_ID) => true,
        Some(id) => config.contains(id),
        None => false,
    }
}

// =============================================================================
// PLACEMENT
// =============================================================================

/// A rendered component inside its absolutely positioned wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    pub id: String,
    /// Wrapper style: position and size, with the component `style` on top.
    pub style: Map<String, Value>,
    pub selected: bool,
    pub node: RenderNode,
}

/// What a canvas (design or preview) shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum CanvasView {
    /// No components; show the placeholder.
    Empty { placeholder: &'static str },
    Placed { nodes: Vec<PlacedNode> },
}

impl CanvasView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    #[must_use]
    pub fn nodes(&self) -> &[PlacedNode] {
        match self {
            Self::Empty { .. } => &[],
            Self::Placed { nodes } => nodes,
        }
    }
}

/// Wrapper style for `component`.
#[must_use]
pub fn wrapper_style(component: &Component) -> Map<String, Value> {
    let mut style = Map::new();
    style.insert("position".into(), json!("absolute"));
    style.insert("left".into(), json!(component.x));
    style.insert("top".into(), json!(component.y));
    style.insert("width".into(), json!(component.width));
    style.insert("height".into(), json!(component.height));
    if let Some(overrides) = &component.style {
        for (k, v) in overrides {
            style.insert(k.clone(), v.clone());
        }
    }
    style
}

/// Wrap a rendered node for placement.
#[must_use]
pub fn place(component: &Component, node: RenderNode, selected: bool) -> PlacedNode {
    PlacedNode { id: component.id.clone(), style: wrapper_style(component), selected, node }
}

/// Render the design canvas: every component unbound, the selection marked.
#[must_use]
pub fn render_design(config: &ReportConfig, selection: Option<&str>) -> CanvasView {
    if config.components.is_empty() {
        return CanvasView::Empty { placeholder: EMPTY_CANVAS_TEXT };
    }
    let nodes = config
        .components
        .iter()
        .map(|c| {
            let node = registry::render(c, &ResolvedData::Unbound);
            place(c, node, selection == Some(c.id.as_str()))
        })
        .collect();
    CanvasView::Placed { nodes }
}
