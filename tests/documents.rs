//! Document decoding, building, catalog extension and build errors.
mod common;

use common::*;
use rensa::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn document(json: &str) -> FlowDocument {
    serde_json::from_str(json).expect("valid document json")
}

#[tokio::test]
async fn documents_build_and_run() {
    let doc = document(
        r#"{
            "name": "counter",
            "variables": [
                { "name": "count", "value": { "type": "integer", "value": 0 } }
            ],
            "steps": [
                {
                    "action": {
                        "kind": "variable",
                        "params": {
                            "target": { "index": 0, "name": "count" },
                            "command": "modify",
                            "expression": "+1"
                        }
                    }
                },
                {
                    "action": {
                        "kind": "variable",
                        "params": {
                            "target": { "index": 0, "name": "count" },
                            "command": "modify",
                            "expression": "+1"
                        }
                    }
                },
                {
                    "action": { "kind": "debug.comment", "params": { "text": "done" } },
                    "finish_type": "stop"
                }
            ]
        }"#,
    );

    let flow = FlowBuilder::new(doc).build().expect("document builds");
    assert_eq!(flow.name(), "counter");
    assert_eq!(flow.steps().len(), 3);

    assert!(Arc::clone(&flow).run().await);
    assert_eq!(
        flow.context().locals().get(0).unwrap().value,
        Variant::Integer(2)
    );
}

#[test]
fn documents_round_trip_through_serde() {
    let doc = document(
        r#"{
            "name": "round-trip",
            "variables": [
                { "name": "speed", "value": { "type": "float", "value": 2.5 } },
                { "name": "armed", "value": { "type": "boolean", "value": true } }
            ],
            "steps": [
                {
                    "action": { "kind": "debug.log", "params": { "message": "hi" } },
                    "run_type": "not_wait"
                },
                {
                    "action": { "kind": "debug.comment" },
                    "finish_type": "go_to",
                    "goto_target": 0
                }
            ]
        }"#,
    );

    let encoded = serde_json::to_string(&doc).expect("document serializes");
    let decoded: FlowDocument = serde_json::from_str(&encoded).expect("document re-parses");
    assert_eq!(doc, decoded);
}

#[test]
fn unknown_action_kind_is_a_build_error() {
    let doc = document(
        r#"{
            "name": "broken",
            "steps": [ { "action": { "kind": "scene.teleport" } } ]
        }"#,
    );

    let err = FlowBuilder::new(doc).build().unwrap_err();
    assert!(err.to_string().contains("step 0"));
    assert!(err.to_string().contains("scene.teleport"));
}

#[test]
fn unsupported_comparator_operator_is_a_build_error() {
    let doc = document(
        r#"{
            "name": "broken",
            "steps": [
                {
                    "action": {
                        "kind": "flow.branch",
                        "params": {
                            "comparator": {
                                "kind": "str",
                                "lhs": "a",
                                "rhs": "b",
                                "op": "greater"
                            },
                            "on_true": "continue",
                            "on_false": "stop"
                        }
                    }
                }
            ]
        }"#,
    );

    let err = FlowBuilder::new(doc).build().unwrap_err();
    assert!(err.to_string().contains("does not support"));
}

#[test]
fn goto_finish_without_target_is_a_build_error() {
    let doc = document(
        r#"{
            "name": "broken",
            "steps": [
                {
                    "action": { "kind": "debug.comment" },
                    "finish_type": "go_to"
                }
            ]
        }"#,
    );

    let err = FlowBuilder::new(doc).build().unwrap_err();
    assert!(err.to_string().contains("goto target"));
}

#[test]
fn malformed_params_name_the_offending_kind() {
    let doc = document(
        r#"{
            "name": "broken",
            "steps": [ { "action": { "kind": "time.delay", "params": {} } } ]
        }"#,
    );

    let err = FlowBuilder::new(doc).build().unwrap_err();
    assert!(err.to_string().contains("time.delay"));
}

#[tokio::test]
async fn subflow_steps_resolve_registered_flows() {
    let ran = Arc::new(AtomicUsize::new(0));
    let child = flow_of(vec![Step::new(counting_action("child", &ran))]);

    let doc = document(
        r#"{
            "name": "parent",
            "steps": [
                {
                    "action": {
                        "kind": "flow.subflow",
                        "params": { "flow": "child", "command": "run" }
                    }
                }
            ]
        }"#,
    );

    let parent = FlowBuilder::new(doc)
        .with_subflow("child", child)
        .build()
        .expect("parent builds");

    assert!(parent.run().await);
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn unregistered_subflow_is_a_build_error() {
    let doc = document(
        r#"{
            "name": "parent",
            "steps": [
                {
                    "action": {
                        "kind": "flow.subflow",
                        "params": { "flow": "ghost", "command": "run" }
                    }
                }
            ]
        }"#,
    );

    let err = FlowBuilder::new(doc).build().unwrap_err();
    assert!(err.to_string().contains("ghost"));
}

#[tokio::test]
async fn custom_kinds_register_on_the_catalog() {
    let doc = document(
        r#"{
            "name": "custom",
            "steps": [ { "action": { "kind": "test.noop" } } ]
        }"#,
    );

    let mut catalog = ActionCatalog::with_defaults();
    catalog.register(
        "test.noop",
        CatalogEntry::new(
            ActionMeta {
                display_name: "No-op",
                menu_path: "Test/No-op",
            },
            Box::new(|_params, _ctx| Ok(Arc::new(CommentAction::new("noop")))),
        ),
    );

    let flow = FlowBuilder::new(doc)
        .with_catalog(catalog)
        .build()
        .expect("custom kind builds");
    assert!(flow.run().await);
}

#[test]
fn catalog_metadata_is_statically_registered() {
    let catalog = ActionCatalog::with_defaults();
    let entry = catalog.get("time.delay").expect("built-in kind");
    assert_eq!(entry.meta.display_name, "Delay");
    assert_eq!(entry.meta.menu_path, "Time/Delay");
    assert!(catalog.contains("flow.branch"));
    assert!(!catalog.contains("scene.teleport"));
}

#[tokio::test]
async fn branch_documents_drive_goto_dispatch() {
    let doc = document(
        r#"{
            "name": "branching",
            "variables": [
                { "name": "lives", "value": { "type": "integer", "value": 2 } },
                { "name": "result", "value": { "type": "string", "value": "" } }
            ],
            "steps": [
                {
                    "action": {
                        "kind": "flow.branch",
                        "params": {
                            "comparator": {
                                "kind": "int",
                                "lhs": { "index": 0, "name": "lives" },
                                "rhs": 0,
                                "op": "greater"
                            },
                            "on_true": { "go_to": 2 },
                            "on_false": "continue"
                        }
                    }
                },
                {
                    "action": {
                        "kind": "variable",
                        "params": {
                            "target": { "index": 1, "name": "result" },
                            "command": "set",
                            "value": { "type": "str", "value": "dead" }
                        }
                    },
                    "finish_type": "stop"
                },
                {
                    "action": {
                        "kind": "variable",
                        "params": {
                            "target": { "index": 1, "name": "result" },
                            "command": "set",
                            "value": { "type": "str", "value": "alive" }
                        }
                    },
                    "finish_type": "stop"
                }
            ]
        }"#,
    );

    let flow = FlowBuilder::new(doc).build().expect("document builds");
    assert!(Arc::clone(&flow).run().await);

    {
        let flow = Arc::clone(&flow);
        wait_until(move || {
            flow.context().locals().get(1).unwrap().value == Variant::String("alive".to_string())
        })
        .await;
    }
    assert_eq!(
        flow.context().locals().get(0).unwrap().value,
        Variant::Integer(2)
    );
}

#[test]
fn globals_documents_build_shared_stores() {
    let doc: GlobalsDocument = serde_json::from_str(
        r#"{
            "variables": [
                { "name": "score", "value": { "type": "integer", "value": 100 } }
            ]
        }"#,
    )
    .expect("valid globals json");

    let globals = Arc::new(doc.into_globals());
    assert_eq!(globals.get(0).unwrap().value, Variant::Integer(100));

    globals.set(0, Variant::Integer(42));
    globals.reset();
    assert_eq!(globals.get(0).unwrap().value, Variant::Integer(100));
}

struct LegacyCue {
    name: String,
    messages: Vec<String>,
}

impl IntoFlowDocument for LegacyCue {
    fn into_flow_document(self) -> Result<FlowDocument, DocumentError> {
        if self.name.is_empty() {
            return Err(DocumentError::Validation("cue has no name".to_string()));
        }
        let steps = self
            .messages
            .into_iter()
            .map(|message| StepDef {
                action: ActionDef {
                    kind: "debug.log".to_string(),
                    params: serde_json::json!({ "message": message }),
                },
                run_type: RunType::Wait,
                finish_type: FinishType::Continue,
                goto_target: None,
            })
            .collect();
        Ok(FlowDocument {
            name: self.name,
            variables: Vec::new(),
            steps,
        })
    }
}

#[tokio::test]
async fn custom_formats_convert_through_into_flow_document() {
    let cue = LegacyCue {
        name: "intro".to_string(),
        messages: vec!["lights".to_string(), "camera".to_string()],
    };

    let doc = cue.into_flow_document().expect("cue converts");
    assert_eq!(doc.steps.len(), 2);

    let flow = FlowBuilder::new(doc).build().expect("converted doc builds");
    assert!(flow.run().await);

    let nameless = LegacyCue {
        name: String::new(),
        messages: Vec::new(),
    };
    assert!(nameless.into_flow_document().is_err());
}
