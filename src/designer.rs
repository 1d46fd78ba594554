//! Designer shell: owns the report document and the transient editing state.
//!
//! Three independent concerns live here: the drag lifecycle, the selection,
//! and the design/preview tab. None of them is ever written into the
//! [`ReportConfig`]; saving hands the document alone to an external sink.

#[cfg(test)]
#[path = "designer_test.rs"]
mod designer_test;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::canvas::{self, Canvas, CanvasView, DragSource, Point};
use crate::error::ErrorCode;
use crate::http::FetchError;
use crate::model::{Component, ComponentKind, IdGen, ModelError, ReportConfig};
use crate::panel::{PanelError, PanelView, PropertyPanel};

// =============================================================================
// SAVE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("save request failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("save rejected: {0}")]
    Rejected(String),
}

impl ErrorCode for SaveError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Fetch(e) => e.error_code(),
            Self::Rejected(_) => "E_SAVE_REJECTED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.retryable(),
            Self::Rejected(_) => false,
        }
    }
}

/// Persistence callback for the whole document.
#[async_trait::async_trait]
pub trait SaveSink: Send + Sync {
    /// Persist `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`SaveError`] if the backend does not accept the document.
    async fn save(&self, config: &ReportConfig) -> Result<(), SaveError>;
}

// =============================================================================
// STATE
// =============================================================================

/// Mutations reported back to the host after an input.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ComponentCreated(Component),
    ComponentMoved { id: String, x: f64, y: f64 },
    ComponentUpdated(Component),
    ComponentRemoved { id: String },
    SelectionChanged(Option<String>),
    /// A drag ended outside every valid drop target.
    DropDiscarded,
}

/// Drag lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { source: DragSource },
}

/// Which view of the document is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Design,
    Preview,
}

/// Top-level state owner for one open designer session.
#[derive(Debug)]
pub struct DesignerShell {
    config: ReportConfig,
    selection: Option<String>,
    drag: DragState,
    tab: Tab,
    canvas: Canvas,
    ids: IdGen,
}

impl DesignerShell {
    /// Open a session on `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the document violates id uniqueness or
    /// geometry bounds.
    pub fn new(config: ReportConfig) -> Result<Self, ModelError> {
        config.validate()?;
        Ok(Self {
            config,
            selection: None,
            drag: DragState::Idle,
            tab: Tab::Design,
            canvas: Canvas::new(),
            ids: IdGen::new(),
        })
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    #[must_use]
    pub fn into_config(self) -> ReportConfig {
        self.config
    }

    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    #[must_use]
    pub fn selected_component(&self) -> Option<&Component> {
        self.selection.as_deref().and_then(|id| self.config.component(id))
    }

    #[must_use]
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    #[must_use]
    pub fn tab(&self) -> Tab {
        self.tab
    }

    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The design canvas with the current selection marked.
    #[must_use]
    pub fn render_design(&self) -> CanvasView {
        canvas::render_design(&self.config, self.selection())
    }

    /// The property panel form for the current selection.
    #[must_use]
    pub fn panel_view(&self, panel: &PropertyPanel) -> PanelView {
        panel.view(self.selected_component())
    }

    // --- Tab ---

    /// Switch tabs. Never touches the document.
    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    // --- Drag lifecycle ---

    /// A drag started on `drag_id` (a palette item or a placed component).
    pub fn drag_start(&mut self, drag_id: &str) {
        let source = DragSource::parse(drag_id);
        debug!(?source, "drag start");
        self.drag = DragState::Dragging { source };
    }

    /// The active drag moved over `over` (or over nothing).
    pub fn drag_over(&mut self, over: Option<&str>) {
        if matches!(self.drag, DragState::Dragging { .. }) {
            self.canvas.drag_over(over, &self.config);
        }
    }

    /// The drag was aborted (e.g. Escape).
    pub fn drag_cancel(&mut self) {
        self.drag = DragState::Idle;
        self.canvas.drag_left();
    }

    /// The drag ended over `over` after moving by `delta`.
    ///
    /// `pointer` is the drop position in canvas coordinates, used to place a
    /// new component; without it the component lands at the origin.
    pub fn drag_end(&mut self, over: Option<&str>, delta: Point, pointer: Option<Point>) -> Vec<Action> {
        let state = std::mem::take(&mut self.drag);
        self.canvas.drag_left();
        let DragState::Dragging { source } = state else {
            return Vec::new();
        };
        if !canvas::is_drop_target(over, &self.config) {
            debug!(?source, ?over, "drop outside canvas discarded");
            return vec![Action::DropDiscarded];
        }
        if !delta.is_finite() || pointer.is_some_and(|p| !p.is_finite()) {
            warn!(?source, ?delta, ?pointer, "drop with non-finite geometry discarded");
            return vec![Action::DropDiscarded];
        }

        match source {
            DragSource::Palette(ComponentKind::Other(tag)) if tag.is_empty() => {
                debug!("palette drag without a type tag discarded");
                vec![Action::DropDiscarded]
            }
            DragSource::Palette(kind) => {
                let id = self.fresh_id();
                let component = canvas::new_component(id.clone(), kind, pointer.unwrap_or_default());
                info!(%id, kind = %component.kind, "component created");
                self.config.components.push(component.clone());
                self.selection = Some(id.clone());
                vec![Action::ComponentCreated(component), Action::SelectionChanged(Some(id))]
            }
            DragSource::Placed(id) => {
                let Some(idx) = self.config.position(&id) else {
                    warn!(%id, "drag ended for unknown component");
                    return vec![Action::DropDiscarded];
                };
                let component = &mut self.config.components[idx];
                let to = canvas::moved_position(component, delta);
                component.x = to.x;
                component.y = to.y;
                vec![Action::ComponentMoved { id, x: to.x, y: to.y }]
            }
        }
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let id = self.ids.next_id();
            if !self.config.contains(&id) {
                return id;
            }
        }
    }

    // --- Selection ---

    /// Select a placed component (click). Unknown ids are ignored.
    pub fn select(&mut self, id: &str) -> Option<Action> {
        if !self.config.contains(id) {
            warn!(%id, "select ignored: no such component");
            return None;
        }
        if self.selection.as_deref() == Some(id) {
            return None;
        }
        self.selection = Some(id.to_owned());
        Some(Action::SelectionChanged(self.selection.clone()))
    }

    // --- Edits ---

    /// Replace the component with `patched.id` and re-select it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no component has that id, or a geometry error if
    /// the patched component is out of bounds.
    pub fn apply_patch(&mut self, patched: Component) -> Result<Action, ModelError> {
        patched.check_geometry()?;
        let Some(idx) = self.config.position(&patched.id) else {
            return Err(ModelError::NotFound(patched.id));
        };
        self.config.components[idx] = patched.clone();
        self.selection = Some(patched.id.clone());
        Ok(Action::ComponentUpdated(patched))
    }

    /// Edit one field of the selected component through `panel`.
    ///
    /// Returns `Ok(None)` when nothing is selected.
    ///
    /// # Errors
    ///
    /// Returns a [`PanelError`] if the field is not editable or the value is
    /// invalid; the document is left unchanged.
    pub fn edit_selected(&mut self, panel: &PropertyPanel, key: &str, value: Value) -> Result<Option<Action>, PanelError> {
        let Some(patched) = panel.edit(self.selected_component(), key, value)? else {
            return Ok(None);
        };
        Ok(Some(self.apply_patch(patched)?))
    }

    /// Remove a component. Clears the selection if it pointed at it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no component has that id.
    pub fn remove_component(&mut self, id: &str) -> Result<Vec<Action>, ModelError> {
        let Some(idx) = self.config.position(id) else {
            return Err(ModelError::NotFound(id.to_owned()));
        };
        self.config.components.remove(idx);
        let mut actions = vec![Action::ComponentRemoved { id: id.to_owned() }];
        if self.selection.as_deref() == Some(id) {
            self.selection = None;
            actions.push(Action::SelectionChanged(None));
        }
        Ok(actions)
    }

    // --- Save ---

    /// Hand the full document to `sink`.
    ///
    /// # Errors
    ///
    /// Propagates the sink's [`SaveError`] after logging it.
    pub async fn save(&self, sink: &dyn SaveSink) -> Result<(), SaveError> {
        match sink.save(&self.config).await {
            Ok(()) => {
                info!(components = self.config.components.len(), "report saved");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, code = e.error_code(), "report save failed");
                Err(e)
            }
        }
    }
}
