#![allow(clippy::float_cmp)]

use std::sync::Mutex;

use serde_json::json;

use super::*;
use crate::consts::{CANVAS_DROP_ID, CHART_SIZE};
use crate::model::{ChartType, ComponentKind};

/// Records every saved document; optionally rejects.
struct MockSink {
    saved: Mutex<Vec<ReportConfig>>,
    reject: bool,
}

impl MockSink {
    fn accepting() -> Self {
        Self { saved: Mutex::new(Vec::new()), reject: false }
    }

    fn rejecting() -> Self {
        Self { saved: Mutex::new(Vec::new()), reject: true }
    }
}

#[async_trait::async_trait]
impl SaveSink for MockSink {
    async fn save(&self, config: &ReportConfig) -> Result<(), SaveError> {
        if self.reject {
            return Err(SaveError::Rejected("read-only template".into()));
        }
        self.saved.lock().unwrap().push(config.clone());
        Ok(())
    }
}

fn shell_with(components: Vec<Component>) -> DesignerShell {
    DesignerShell::new(ReportConfig { components, ..ReportConfig::new() }).unwrap()
}

fn chart(id: &str) -> Component {
    Component::new(id, ComponentKind::Chart, 40.0, 50.0, 400.0, 300.0)
}

// =============================================================
// Open
// =============================================================

#[test]
fn new_rejects_duplicate_ids() {
    let cfg = ReportConfig { components: vec![chart("a"), chart("a")], ..ReportConfig::new() };
    assert!(matches!(DesignerShell::new(cfg), Err(ModelError::DuplicateId(id)) if id == "a"));
}

#[test]
fn new_session_starts_idle_on_design_tab() {
    let shell = shell_with(vec![]);
    assert_eq!(shell.tab(), Tab::Design);
    assert_eq!(shell.drag_state(), &DragState::Idle);
    assert!(shell.selection().is_none());
    assert!(shell.render_design().is_empty());
}

// =============================================================
// Drag lifecycle
// =============================================================

#[test]
fn palette_drop_appends_one_component_and_selects_it() {
    let mut shell = shell_with(vec![chart("a")]);
    shell.drag_start("palette-chart");
    shell.drag_over(Some(CANVAS_DROP_ID));
    let actions = shell.drag_end(Some(CANVAS_DROP_ID), Point::new(0.0, 0.0), Some(Point::new(120.0, 80.0)));

    assert_eq!(shell.config().components.len(), 2);
    let created = &shell.config().components[1];
    assert_eq!(created.kind, ComponentKind::Chart);
    assert_eq!((created.width, created.height), CHART_SIZE);
    assert_eq!((created.x, created.y), (120.0, 80.0));
    assert_ne!(created.id, "a");
    assert_eq!(shell.selection(), Some(created.id.as_str()));
    assert_eq!(
        actions,
        vec![Action::ComponentCreated(created.clone()), Action::SelectionChanged(Some(created.id.clone()))]
    );
    assert_eq!(shell.drag_state(), &DragState::Idle);
}

#[test]
fn palette_drop_without_pointer_lands_at_origin() {
    let mut shell = shell_with(vec![]);
    shell.drag_start("palette-text");
    shell.drag_end(Some(CANVAS_DROP_ID), Point::new(30.0, 30.0), None);
    let created = &shell.config().components[0];
    assert_eq!((created.x, created.y), (0.0, 0.0));
}

#[test]
fn repeated_drops_get_distinct_ids() {
    let mut shell = shell_with(vec![]);
    for _ in 0..5 {
        shell.drag_start("palette-image");
        shell.drag_end(Some(CANVAS_DROP_ID), Point::default(), None);
    }
    let cfg = shell.config();
    assert_eq!(cfg.components.len(), 5);
    assert!(cfg.validate().is_ok());
}

#[test]
fn moving_applies_delta_and_nothing_else() {
    let mut shell = shell_with(vec![chart("a"), chart("b")]);
    let before = shell.config().clone();
    shell.drag_start("a");
    let actions = shell.drag_end(Some(CANVAS_DROP_ID), Point::new(-100.0, 25.0), None);

    assert_eq!(actions, vec![Action::ComponentMoved { id: "a".into(), x: 0.0, y: 75.0 }]);
    let moved = shell.config().component("a").unwrap();
    assert_eq!((moved.x, moved.y), (0.0, 75.0));
    assert_eq!((moved.width, moved.height), (400.0, 300.0));
    assert_eq!(shell.config().components[1], before.components[1]);
    assert!(shell.selection().is_none());
}

#[test]
fn drop_on_a_placed_component_counts_as_canvas() {
    let mut shell = shell_with(vec![chart("a"), chart("b")]);
    shell.drag_start("a");
    let actions = shell.drag_end(Some("b"), Point::new(5.0, 5.0), None);
    assert!(matches!(actions.as_slice(), [Action::ComponentMoved { .. }]));
}

#[test]
fn drop_outside_canvas_is_discarded() {
    let mut shell = shell_with(vec![chart("a")]);
    let before = shell.config().clone();

    shell.drag_start("palette-table");
    assert_eq!(shell.drag_end(None, Point::new(10.0, 10.0), None), vec![Action::DropDiscarded]);
    shell.drag_start("a");
    assert_eq!(shell.drag_end(Some("toolbar"), Point::new(10.0, 10.0), None), vec![Action::DropDiscarded]);

    assert_eq!(shell.config(), &before);
}

#[test]
fn non_finite_drag_is_discarded_and_document_still_roundtrips() {
    let mut shell = shell_with(vec![chart("a")]);
    let before = shell.config().clone();

    shell.drag_start("a");
    let moved = shell.drag_end(Some(CANVAS_DROP_ID), Point::new(f64::INFINITY, 0.0), None);
    assert_eq!(moved, vec![Action::DropDiscarded]);
    shell.drag_start("palette-text");
    let created = shell.drag_end(Some(CANVAS_DROP_ID), Point::default(), Some(Point::new(f64::NAN, 5.0)));
    assert_eq!(created, vec![Action::DropDiscarded]);

    assert_eq!(shell.config(), &before);
    let reparsed = ReportConfig::from_json(&shell.config().to_json().unwrap()).unwrap();
    assert_eq!(&reparsed, shell.config());
}

#[test]
fn bare_palette_prefix_is_discarded() {
    let mut shell = shell_with(vec![]);
    shell.drag_start("palette-");
    assert_eq!(shell.drag_end(Some(CANVAS_DROP_ID), Point::default(), None), vec![Action::DropDiscarded]);
    assert!(shell.config().components.is_empty());
    assert!(shell.selection().is_none());
}

#[test]
fn drag_end_without_drag_start_does_nothing() {
    let mut shell = shell_with(vec![chart("a")]);
    assert!(shell.drag_end(Some(CANVAS_DROP_ID), Point::new(1.0, 1.0), None).is_empty());
}

#[test]
fn unknown_placed_id_is_discarded() {
    let mut shell = shell_with(vec![]);
    shell.drag_start("ghost");
    assert_eq!(shell.drag_end(Some(CANVAS_DROP_ID), Point::new(1.0, 1.0), None), vec![Action::DropDiscarded]);
}

#[test]
fn drag_cancel_resets_surface() {
    let mut shell = shell_with(vec![]);
    shell.drag_start("palette-chart");
    shell.drag_over(Some(CANVAS_DROP_ID));
    assert_eq!(shell.canvas().surface(), crate::canvas::Surface::Hovering);
    shell.drag_cancel();
    assert_eq!(shell.canvas().surface(), crate::canvas::Surface::Idle);
    assert_eq!(shell.drag_state(), &DragState::Idle);
}

// =============================================================
// Selection and edits
// =============================================================

#[test]
fn select_reports_only_changes() {
    let mut shell = shell_with(vec![chart("a")]);
    assert_eq!(shell.select("a"), Some(Action::SelectionChanged(Some("a".into()))));
    assert_eq!(shell.select("a"), None);
    assert_eq!(shell.select("missing"), None);
    assert_eq!(shell.selection(), Some("a"));
}

#[test]
fn edit_changes_only_the_selected_component() {
    let mut shell = shell_with(vec![chart("a"), chart("b")]);
    let panel = PropertyPanel::new();
    let untouched = serde_json::to_string(shell.config().component("b").unwrap()).unwrap();
    shell.select("a");
    let action = shell.edit_selected(&panel, "chartType", json!("pie")).unwrap().unwrap();

    let edited = shell.config().component("a").unwrap();
    assert_eq!(edited.chart_type(), ChartType::Pie);
    assert_eq!(edited.id, "a");
    assert_eq!(action, Action::ComponentUpdated(edited.clone()));
    assert_eq!(serde_json::to_string(shell.config().component("b").unwrap()).unwrap(), untouched);
    assert_eq!(shell.selection(), Some("a"));
}

#[test]
fn edit_without_selection_is_a_no_op() {
    let mut shell = shell_with(vec![chart("a")]);
    assert!(shell.edit_selected(&PropertyPanel::new(), "x", json!(5)).unwrap().is_none());
}

#[test]
fn rejected_edit_leaves_document_unchanged() {
    let mut shell = shell_with(vec![chart("a")]);
    shell.select("a");
    let before = shell.config().clone();
    assert!(shell.edit_selected(&PropertyPanel::new(), "height", json!(-4)).is_err());
    assert_eq!(shell.config(), &before);
}

#[test]
fn apply_patch_requires_existing_id() {
    let mut shell = shell_with(vec![chart("a")]);
    let err = shell.apply_patch(chart("zzz")).unwrap_err();
    assert!(matches!(err, ModelError::NotFound(id) if id == "zzz"));
}

#[test]
fn panel_view_follows_selection() {
    let mut shell = shell_with(vec![chart("a")]);
    let panel = PropertyPanel::new();
    assert_eq!(shell.panel_view(&panel), PanelView::Empty);
    shell.select("a");
    assert!(shell.panel_view(&panel).field("chartType").is_some());
}

#[test]
fn tab_switching_never_touches_document() {
    let mut shell = shell_with(vec![chart("a")]);
    shell.select("a");
    let before = shell.config().clone();
    shell.set_tab(Tab::Preview);
    shell.set_tab(Tab::Design);
    assert_eq!(shell.config(), &before);
    assert_eq!(shell.selection(), Some("a"));
}

#[test]
fn remove_selected_component_clears_selection() {
    let mut shell = shell_with(vec![chart("a"), chart("b")]);
    shell.select("a");
    let actions = shell.remove_component("a").unwrap();
    assert_eq!(actions, vec![Action::ComponentRemoved { id: "a".into() }, Action::SelectionChanged(None)]);
    assert!(shell.selection().is_none());
    assert_eq!(shell.config().components.len(), 1);
    assert!(shell.remove_component("a").is_err());
}

#[test]
fn remove_other_component_keeps_selection() {
    let mut shell = shell_with(vec![chart("a"), chart("b")]);
    shell.select("a");
    assert_eq!(shell.remove_component("b").unwrap(), vec![Action::ComponentRemoved { id: "b".into() }]);
    assert_eq!(shell.selection(), Some("a"));
}

// =============================================================
// Save
// =============================================================

#[tokio::test]
async fn save_hands_whole_document_to_sink() {
    let mut shell = shell_with(vec![chart("a")]);
    shell.select("a");
    let sink = MockSink::accepting();
    shell.save(&sink).await.unwrap();
    let saved = sink.saved.lock().unwrap();
    assert_eq!(saved.as_slice(), &[shell.config().clone()]);
}

#[tokio::test]
async fn save_failure_is_propagated() {
    let shell = shell_with(vec![chart("a")]);
    let err = shell.save(&MockSink::rejecting()).await.unwrap_err();
    assert_eq!(err.error_code(), "E_SAVE_REJECTED");
    assert!(!err.retryable());
}

#[test]
fn save_error_delegates_fetch_codes() {
    let err = SaveError::from(FetchError::Status { url: "u".into(), status: 503 });
    assert_eq!(err.error_code(), "E_FETCH_STATUS");
    assert!(err.retryable());
}
