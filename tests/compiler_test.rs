use dunflow::compiler::core::Compiler;
use dunflow::dsl::builder::FlowBuilder;
use dunflow::error::GraphError;
use serde_json::{json, Value};

#[test]
fn test_compile_indexes_nodes_and_edges() {
    let flow = FlowBuilder::new("compile-test")
        .trigger("t1", "Invoice Overdue")
        .trigger("t2", "Invoice Paid")
        .trigger("t3", "Invoice Overdue")
        .action("a", "send_sms", "seq")
        .exit("x", "done")
        .connect("t1", "a")
        .connect("t3", "a")
        .connect("a", "x")
        .build();

    let mut compiler = Compiler::new();
    let blueprint = compiler.compile_flow(&flow).expect("Compilation failed");

    assert_eq!(blueprint.flow_id, "compile-test");
    assert_eq!(blueprint.nodes.len(), 5);
    assert!(blueprint.node("a").is_some());
    assert!(blueprint.node("missing").is_none());

    let triggers: Vec<&str> = blueprint
        .triggers_for("Invoice Overdue")
        .iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(triggers, vec!["t1", "t3"]);
    assert!(!blueprint.has_trigger_for("Contact Created"));

    let out: Vec<&str> = blueprint.outgoing("a").iter().map(|e| e.target.as_str()).collect();
    assert_eq!(out, vec!["x"]);
    assert!(blueprint.outgoing("x").is_empty());
}

#[test]
fn test_compile_rejects_duplicate_ids() {
    let nodes = json!([
        { "id": "n", "type": "trigger", "data": { "triggerType": "A" } },
        { "id": "n", "type": "exit" }
    ]);
    let err = Compiler::new().compile("dup", nodes, json!([])).unwrap_err();
    assert!(matches!(err, GraphError::DuplicateNode(ref id) if id == "n"));
}

#[test]
fn test_compile_rejects_dangling_edges() {
    let nodes = json!([{ "id": "t", "type": "trigger", "data": { "triggerType": "A" } }]);
    let edges = json!([{ "source": "t", "target": "ghost" }]);
    let err = Compiler::new().compile("dangling", nodes, edges).unwrap_err();
    match err {
        GraphError::DanglingEdge { missing, .. } => assert_eq!(missing, "ghost"),
        other => panic!("Unexpected error: {}", other),
    }
}

#[test]
fn test_compile_rejects_non_array_graph() {
    let err = Compiler::new().compile("bad", json!({ "oops": true }), json!([])).unwrap_err();
    assert!(matches!(err, GraphError::Malformed { what: "nodes", .. }));

    let err = Compiler::new().compile("bad", json!([]), json!("edges")).unwrap_err();
    assert!(matches!(err, GraphError::Malformed { what: "edges", .. }));
}

#[test]
fn test_compile_treats_null_graph_as_empty() {
    let blueprint = Compiler::new()
        .compile("empty", Value::Null, Value::Null)
        .expect("Compilation failed");
    assert!(blueprint.nodes.is_empty());
    assert!(!blueprint.has_trigger_for("anything"));
}

#[test]
fn test_edge_handle_from_branch_id() {
    let flow = FlowBuilder::new("handles")
        .trigger("t", "A")
        .action("a", "send_email", "s")
        .action("b", "send_email", "s")
        .connect_branch("t", "a", "yes")
        .connect("t", "b")
        .build();

    let blueprint = Compiler::new().compile_flow(&flow).expect("Compilation failed");
    let edges = blueprint.outgoing("t");
    assert_eq!(edges[0].handle(), Some("yes"));
    assert!(!edges[0].is_default());
    assert!(edges[1].is_default());
}

#[test]
fn test_compile_graph_validates_typed_graphs() {
    let graph = FlowBuilder::new("typed")
        .trigger("t", "Invoice Overdue")
        .wait("w", 2, "days")
        .connect("t", "w")
        .graph();
    let blueprint = Compiler::new().compile_graph("typed", graph).expect("Compilation failed");
    assert_eq!(blueprint.flow_id, "typed");
    assert_eq!(blueprint.outgoing("t").len(), 1);

    let dangling = FlowBuilder::new("typed")
        .trigger("t", "Invoice Overdue")
        .connect("t", "gone")
        .graph();
    let err = Compiler::new().compile_graph("typed", dangling).unwrap_err();
    assert!(matches!(err, GraphError::DanglingEdge { ref missing, .. } if missing == "gone"));
}

#[test]
fn test_untyped_trigger_matches_no_event() {
    let nodes = json!([{ "id": "t", "type": "trigger" }, { "id": "u", "type": "trigger", "data": { "triggerType": "" } }]);
    let blueprint = Compiler::new().compile("f", nodes, Value::Null).expect("Compilation failed");
    assert!(blueprint.triggers_for("").is_empty());
    assert!(!blueprint.has_trigger_for(""));
}
