#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn config_with(components: Vec<Component>) -> ReportConfig {
    ReportConfig { components, ..ReportConfig::new() }
}

// =============================================================
// Drag sources
// =============================================================

#[test]
fn palette_prefix_marks_new_component() {
    assert_eq!(DragSource::parse("palette-chart"), DragSource::Palette(ComponentKind::Chart));
    assert_eq!(DragSource::parse("palette-core-config"), DragSource::Palette(ComponentKind::CoreConfig));
}

#[test]
fn other_ids_are_placed_components() {
    assert_eq!(DragSource::parse("comp_1_0"), DragSource::Placed("comp_1_0".into()));
}

#[test]
fn drag_id_roundtrips() {
    let source = DragSource::Palette(ComponentKind::BusinessConfig);
    assert_eq!(DragSource::parse(&source.drag_id()), source);
}

#[test]
fn palette_lists_known_kinds_with_defaults() {
    let items = palette();
    assert_eq!(items.len(), 8);
    let table = items.iter().find(|i| i.kind == ComponentKind::Table).unwrap();
    assert_eq!(table.drag_id, "palette-table");
    assert_eq!((table.width, table.height), TABLE_SIZE);
}

// =============================================================
// Geometry
// =============================================================

#[test]
fn default_sizes_are_ordered_by_kind() {
    let panel = default_size(&ComponentKind::SystemConfig);
    let table = default_size(&ComponentKind::Table);
    let chart = default_size(&ComponentKind::Chart);
    assert!(panel.0 > table.0 && panel.1 > table.1);
    assert!(table.0 > chart.0);
    assert_eq!(default_size(&ComponentKind::Other("x".into())), FALLBACK_SIZE);
}

#[test]
fn new_component_gets_defaults_and_clamped_position() {
    let c = new_component("n1".into(), ComponentKind::Text, Point::new(-5.0, 12.0));
    assert_eq!((c.x, c.y), (0.0, 12.0));
    assert_eq!((c.width, c.height), TEXT_SIZE);
    assert_eq!(c.text_type(), crate::model::TextType::Paragraph);
    assert!(c.check_geometry().is_ok());
}

#[test]
fn moved_position_adds_delta() {
    let c = Component::new("a", ComponentKind::Image, 50.0, 60.0, 10.0, 10.0);
    assert_eq!(moved_position(&c, Point::new(15.0, -20.0)), Point::new(65.0, 40.0));
}

#[test]
fn moved_position_pins_at_origin() {
    let c = Component::new("a", ComponentKind::Image, 50.0, 60.0, 10.0, 10.0);
    assert_eq!(moved_position(&c, Point::new(-80.0, -61.0)), Point::new(0.0, 0.0));
}

// =============================================================
// Surface
// =============================================================

#[test]
fn surface_hovers_only_over_valid_targets() {
    let cfg = config_with(vec![Component::new("a", ComponentKind::Text, 0.0, 0.0, 1.0, 1.0)]);
    let mut canvas = Canvas::new();
    assert_eq!(canvas.surface(), Surface::Idle);
    canvas.drag_over(Some(CANVAS_DROP_ID), &cfg);
    assert_eq!(canvas.surface(), Surface::Hovering);
    canvas.drag_over(Some("sidebar"), &cfg);
    assert_eq!(canvas.surface(), Surface::Idle);
    canvas.drag_over(Some("a"), &cfg);
    assert_eq!(canvas.surface(), Surface::Hovering);
    canvas.drag_left();
    assert_eq!(canvas.surface(), Surface::Idle);
}

// =============================================================
// Placement
// =============================================================

#[test]
fn empty_config_renders_placeholder() {
    let view = render_design(&ReportConfig::new(), None);
    assert_eq!(view, CanvasView::Empty { placeholder: EMPTY_CANVAS_TEXT });
    assert!(view.nodes().is_empty());
}

#[test]
fn design_render_marks_selection_and_keeps_placeholders() {
    let mut text = Component::new("t", ComponentKind::Text, 5.0, 6.0, 100.0, 40.0);
    text.fields.insert("content".into(), json!("Order {{code}}"));
    let image = Component::new("i", ComponentKind::Image, 0.0, 0.0, 10.0, 10.0);
    let view = render_design(&config_with(vec![text, image]), Some("t"));

    let nodes = view.nodes();
    assert_eq!(nodes.len(), 2);
    assert!(nodes[0].selected);
    assert!(!nodes[1].selected);
    assert!(matches!(&nodes[0].node, RenderNode::Text { text, .. } if text == "Order {{code}}"));
}

#[test]
fn wrapper_style_merges_component_style() {
    let mut c = Component::new("a", ComponentKind::Text, 5.0, 6.0, 100.0, 40.0);
    c.style = json!({ "border": "1px solid #000", "width": 120 }).as_object().cloned();
    let style = wrapper_style(&c);
    assert_eq!(style["position"], json!("absolute"));
    assert_eq!(style["left"], json!(5.0));
    assert_eq!(style["top"], json!(6.0));
    assert_eq!(style["border"], json!("1px solid #000"));
    assert_eq!(style["width"], json!(120));
}
