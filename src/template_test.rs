use std::sync::Mutex;

use serde_json::json;

use super::*;
use crate::registry::RenderNode;

fn record(config: Option<Value>) -> TemplateRecord {
    TemplateRecord {
        uuid: "tpl-1".into(),
        code: "WO_PRINT".into(),
        name: "Work order".into(),
        document_type: Some("work_order".into()),
        config,
    }
}

fn work_order_report() -> Value {
    json!({
        "version": "1.0",
        "layout": {},
        "components": [
            { "id": "title", "type": "text", "x": 0, "y": 0, "width": 200, "height": 50,
              "textType": "title", "level": 1, "content": "Work order {{code}}" },
            { "id": "ops", "type": "table", "x": 0, "y": 60, "width": 600, "height": 300,
              "dataSource": { "code": "operations" } }
        ]
    })
}

struct MockStore {
    record: TemplateRecord,
    calls: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl TemplateStore for MockStore {
    async fn load(&self, uuid: &str) -> Result<TemplateRecord, FetchError> {
        self.calls.lock().unwrap().push(uuid.to_string());
        if uuid == self.record.uuid {
            Ok(self.record.clone())
        } else {
            Err(FetchError::Status { url: format!("/core/print-templates/{uuid}"), status: 404 })
        }
    }
}

// =============================================================
// Parsing
// =============================================================

#[test]
fn object_config_parses() {
    let cfg = parse_template_config(&record(Some(work_order_report()))).unwrap();
    assert_eq!(cfg.components.len(), 2);
}

#[test]
fn string_config_parses() {
    let raw = work_order_report().to_string();
    let cfg = parse_template_config(&record(Some(Value::String(raw)))).unwrap();
    assert_eq!(cfg.components[0].id, "title");
}

#[test]
fn absent_or_blank_config_is_missing() {
    for config in [None, Some(Value::Null), Some(json!("  "))] {
        let err = parse_template_config(&record(config)).unwrap_err();
        assert!(matches!(err, TemplateError::Missing { ref code } if code == "WO_PRINT"));
        assert_eq!(err.error_code(), "E_TEMPLATE_MISSING");
    }
}

#[test]
fn unparseable_config_is_malformed() {
    let err = parse_template_config(&record(Some(json!("{not json")))).unwrap_err();
    assert!(matches!(err, TemplateError::Malformed { .. }));

    let err = parse_template_config(&record(Some(json!({ "components": "nope" })))).unwrap_err();
    assert!(matches!(err, TemplateError::Malformed { .. }));
}

#[test]
fn duplicate_ids_are_invalid() {
    let mut report = work_order_report();
    report["components"][1]["id"] = json!("title");
    let err = parse_template_config(&record(Some(report))).unwrap_err();
    assert!(matches!(err, TemplateError::Invalid { source: ModelError::DuplicateId(_), .. }));
}

// =============================================================
// Printing
// =============================================================

#[test]
fn render_print_uses_the_record_as_data() {
    let data = json!({
        "code": "WO-001",
        "operations": [{ "operation_code": "OP10" }, { "operation_code": "OP20" }]
    });
    let view = render_print(&record(Some(work_order_report())), data).unwrap();
    let nodes = view.nodes();
    assert!(matches!(&nodes[0].node, RenderNode::Text { text, .. } if text == "Work order WO-001"));
    assert!(matches!(&nodes[1].node, RenderNode::Table { rows, .. } if rows.len() == 2));
}

#[test]
fn render_print_without_config_does_not_render() {
    assert!(matches!(render_print(&record(None), json!({})), Err(TemplateError::Missing { .. })));
}

#[tokio::test]
async fn load_and_render_fetches_once() {
    let store = MockStore { record: record(Some(work_order_report())), calls: Mutex::new(Vec::new()) };
    let view = load_and_render(&store, "tpl-1", json!({ "code": "WO-9" })).await.unwrap();
    assert_eq!(view.nodes().len(), 2);
    assert_eq!(*store.calls.lock().unwrap(), vec!["tpl-1".to_string()]);
}

#[tokio::test]
async fn load_failure_surfaces_as_fetch_error() {
    let store = MockStore { record: record(None), calls: Mutex::new(Vec::new()) };
    let err = load_and_render(&store, "other", json!({})).await.unwrap_err();
    assert!(matches!(err, TemplateError::Fetch(FetchError::Status { status: 404, .. })));
    assert_eq!(err.error_code(), "E_FETCH_STATUS");
}
