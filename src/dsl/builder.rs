use crate::dsl::{
    ActionData, ApprovalData, Branch, Condition, Edge, EdgeData, ExitData, Field, FlowGraph,
    InteractiveData, Node, NodeKind, Operator, SwitchData, TriggerData, WaitData,
};
use crate::runtime::run::{Flow, FlowStatus};
use std::collections::HashMap;
use serde_json::Value;

pub struct FlowBuilder {
    id: String,
    org_id: String,
    name: String,
    status: FlowStatus,
    pub nodes: Vec<Node>, // Public so tests can inject hand-made nodes
    edges: Vec<Edge>,
}

impl FlowBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            org_id: "org_default".to_string(),
            name: id.to_string(),
            status: FlowStatus::Active,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn org(mut self, org_id: &str) -> Self {
        self.org_id = org_id.to_string();
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn status(mut self, status: FlowStatus) -> Self {
        self.status = status;
        self
    }

    fn push(mut self, id: &str, node_type: &str, kind: NodeKind) -> Self {
        self.nodes.push(Node {
            id: id.to_string(),
            node_type: node_type.to_string(),
            kind,
        });
        self
    }

    pub fn trigger(self, id: &str, trigger_type: &str) -> Self {
        self.push(id, "trigger", NodeKind::Trigger(TriggerData {
            trigger_type: trigger_type.to_string(),
        }))
    }

    pub fn switch(self, id: &str, branches: Vec<Branch>) -> Self {
        self.push(id, "switch", NodeKind::Switch(SwitchData { branches }))
    }

    pub fn approval(self, id: &str, channel: &str, message: &str) -> Self {
        self.push(id, "approval", NodeKind::Approval(ApprovalData {
            channel: Some(channel.to_string()),
            message: Some(message.to_string()),
        }))
    }

    /// `routes` maps response values to branch keys
    pub fn interactive(self, id: &str, routes: &[(&str, &str)], default_branch: Option<&str>) -> Self {
        let response_branch_map: HashMap<String, String> = routes
            .iter()
            .map(|(value, branch)| (value.to_string(), branch.to_string()))
            .collect();
        self.push(id, "interactive", NodeKind::Interactive(InteractiveData {
            prompt: None,
            response_branch_map,
            default_branch: default_branch.map(str::to_string),
        }))
    }

    pub fn wait(self, id: &str, duration: impl Into<Value>, unit: &str) -> Self {
        self.push(id, "wait", NodeKind::Wait(WaitData {
            duration: duration.into(),
            unit: unit.to_string(),
        }))
    }

    pub fn exit(self, id: &str, reason: &str) -> Self {
        self.push(id, "exit", NodeKind::Exit(ExitData {
            reason: Some(reason.to_string()),
        }))
    }

    pub fn action(self, id: &str, action_type: &str, sequence: &str) -> Self {
        self.push(id, "action", NodeKind::Action(ActionData {
            sequence: Some(Value::from(sequence)),
            action_type: Some(action_type.to_string()),
        }))
    }

    pub fn connect(mut self, source: &str, target: &str) -> Self {
        self.edges.push(Edge {
            id: None,
            source: source.to_string(),
            target: target.to_string(),
            source_handle: None,
            data: None,
        });
        self
    }

    /// Edge selected by a switch branch id or an interactive branch key
    pub fn connect_handle(mut self, source: &str, target: &str, handle: &str) -> Self {
        self.edges.push(Edge {
            id: None,
            source: source.to_string(),
            target: target.to_string(),
            source_handle: Some(handle.to_string()),
            data: None,
        });
        self
    }

    /// Same as `connect_handle` but keyed through `data.branchId`
    pub fn connect_branch(mut self, source: &str, target: &str, branch_id: &str) -> Self {
        self.edges.push(Edge {
            id: None,
            source: source.to_string(),
            target: target.to_string(),
            source_handle: None,
            data: Some(EdgeData { branch_id: Some(branch_id.to_string()) }),
        });
        self
    }

    pub fn graph(self) -> FlowGraph {
        FlowGraph { nodes: self.nodes, edges: self.edges }
    }

    pub fn build(self) -> Flow {
        let nodes_json = serde_json::to_value(&self.nodes).unwrap_or(Value::Null);
        let edges_json = serde_json::to_value(&self.edges).unwrap_or(Value::Null);
        Flow {
            id: self.id,
            org_id: self.org_id,
            name: self.name,
            status: self.status,
            deleted_at: None,
            nodes_json,
            edges_json,
        }
    }
}

/// Shorthand for a switch branch
pub fn branch(id: &str, field: Field, operator: Operator, value: impl Into<Value>) -> Branch {
    Branch {
        id: id.to_string(),
        name: id.to_string(),
        condition: Condition { field, operator, value: value.into() },
    }
}
