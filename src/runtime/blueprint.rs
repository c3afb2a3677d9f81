use std::collections::HashMap;
use crate::dsl::{Edge, Node, NodeKind};

/// Validated, indexed form of a flow graph (the walker's read-only view)
#[derive(Debug, Clone)]
pub struct Blueprint {
    pub flow_id: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    index: HashMap<String, usize>,
    /// node id -> indices into `edges`, in stored order
    outgoing: HashMap<String, Vec<usize>>,
}

impl Blueprint {
    pub(crate) fn new(flow_id: String, nodes: Vec<Node>, edges: Vec<Edge>, index: HashMap<String, usize>) -> Self {
        let mut outgoing: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, edge) in edges.iter().enumerate() {
            outgoing.entry(edge.source.clone()).or_default().push(i);
        }
        Self { flow_id, nodes, edges, index, outgoing }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn outgoing(&self, id: &str) -> Vec<&Edge> {
        self.outgoing
            .get(id)
            .map(|idxs| idxs.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    /// Trigger nodes whose `triggerType` equals the event type, in stored order.
    /// A trigger without a type never fires.
    pub fn triggers_for(&self, event_type: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| matches!(&n.kind, NodeKind::Trigger(t) if !t.trigger_type.is_empty() && t.trigger_type == event_type))
            .collect()
    }

    pub fn has_trigger_for(&self, event_type: &str) -> bool {
        !self.triggers_for(event_type).is_empty()
    }
}
