pub mod builder;

use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Automation graph as stored by the builder UI
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FlowGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// A graph node. `node_type` keeps the raw type string the builder stored
/// (e.g. "utility-wait" or "action-enroll"), `kind` is the decoded payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub struct Node {
    pub id: String,
    pub node_type: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Trigger(TriggerData),
    Switch(SwitchData),
    Approval(ApprovalData),
    Interactive(InteractiveData),
    Wait(WaitData),
    Exit(ExitData),
    /// Default for any type the engine does not recognise
    Action(ActionData),
}

impl NodeKind {
    /// Decodes kind-specific data. Malformed data never fails the node; it
    /// degrades to the kind's default payload.
    pub fn from_raw(node_type: &str, data: Value) -> Self {
        match node_type {
            "trigger" => NodeKind::Trigger(lenient(node_type, data)),
            "switch" | "condition" => NodeKind::Switch(lenient(node_type, data)),
            "approval" => NodeKind::Approval(lenient(node_type, data)),
            "interactive" => NodeKind::Interactive(lenient(node_type, data)),
            "wait" | "utility-wait" => NodeKind::Wait(lenient(node_type, data)),
            "exit" => NodeKind::Exit(lenient(node_type, data)),
            _ => NodeKind::Action(lenient(node_type, data)),
        }
    }

    pub fn data(&self) -> Value {
        let encoded = match self {
            NodeKind::Trigger(d) => serde_json::to_value(d),
            NodeKind::Switch(d) => serde_json::to_value(d),
            NodeKind::Approval(d) => serde_json::to_value(d),
            NodeKind::Interactive(d) => serde_json::to_value(d),
            NodeKind::Wait(d) => serde_json::to_value(d),
            NodeKind::Exit(d) => serde_json::to_value(d),
            NodeKind::Action(d) => serde_json::to_value(d),
        };
        encoded.unwrap_or(Value::Null)
    }
}

fn lenient<T: DeserializeOwned + Default>(node_type: &str, data: Value) -> T {
    if data.is_null() {
        return T::default();
    }
    match serde_json::from_value(data) {
        Ok(v) => v,
        Err(e) => {
            warn!(node_type, error = %e, "Malformed node data, using defaults");
            T::default()
        }
    }
}

/// Wire shape of a node: `{ "id", "type", "data" }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(rename = "type", alias = "kind", default)]
    pub node_type: String,
    #[serde(default)]
    pub data: Value,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let kind = NodeKind::from_raw(&raw.node_type, raw.data);
        Node { id: raw.id, node_type: raw.node_type, kind }
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        RawNode { data: node.kind.data(), id: node.id, node_type: node.node_type }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerData {
    pub trigger_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchData {
    /// Evaluated in stored order, first match wins
    pub branches: Vec<Branch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub condition: Condition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub field: Field,
    pub operator: Operator,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Amount,
    DaysOverdue,
    Tag,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "contains")]
    Contains,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApprovalData {
    #[serde(alias = "requestedChannel")]
    pub channel: Option<String>,
    #[serde(alias = "requestBody")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractiveData {
    pub prompt: Option<String>,
    pub response_branch_map: HashMap<String, String>,
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitData {
    /// Number or numeric string as produced by the builder form
    pub duration: Value,
    pub unit: String,
}

impl Default for WaitData {
    fn default() -> Self {
        Self { duration: Value::from(1), unit: "hours".to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitData {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionData {
    pub sequence: Option<Value>,
    pub action_type: Option<String>,
}

/// An edge. `sourceHandle` or `data.branchId` selects among the outgoing
/// edges of a switch/interactive node; an edge with neither is the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EdgeData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeData {
    pub branch_id: Option<String>,
}

impl Edge {
    pub fn handle(&self) -> Option<&str> {
        self.source_handle
            .as_deref()
            .or_else(|| self.data.as_ref().and_then(|d| d.branch_id.as_deref()))
            .filter(|h| !h.is_empty())
    }

    pub fn is_default(&self) -> bool {
        self.handle().is_none()
    }
}
