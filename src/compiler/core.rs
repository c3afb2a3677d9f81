use crate::dsl::{Edge, FlowGraph, Node};
use crate::error::GraphError;
use crate::runtime::blueprint::Blueprint;
use crate::runtime::run::Flow;
use std::collections::HashMap;
use serde_json::Value;

/// Turns the opaque `{nodes, edges}` JSON of a flow into a [`Blueprint`].
///
/// Only structural problems fail compilation (arrays that are not arrays,
/// nodes without ids, duplicate ids, edges pointing nowhere). Kind-specific
/// node data is decoded leniently and never fails here.
pub struct Compiler {
    id_map: HashMap<String, usize>,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            id_map: HashMap::new(),
        }
    }

    pub fn compile_flow(&mut self, flow: &Flow) -> Result<Blueprint, GraphError> {
        self.compile(&flow.id, flow.nodes_json.clone(), flow.edges_json.clone())
    }

    pub fn compile_graph(&mut self, flow_id: &str, graph: FlowGraph) -> Result<Blueprint, GraphError> {
        self.build(flow_id, graph.nodes, graph.edges)
    }

    pub fn compile(&mut self, flow_id: &str, nodes_json: Value, edges_json: Value) -> Result<Blueprint, GraphError> {
        // A missing array is an empty graph, not an error
        let nodes: Vec<Node> = if nodes_json.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(nodes_json)
                .map_err(|source| GraphError::Malformed { what: "nodes", source })?
        };
        let edges: Vec<Edge> = if edges_json.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(edges_json)
                .map_err(|source| GraphError::Malformed { what: "edges", source })?
        };
        self.build(flow_id, nodes, edges)
    }

    fn build(&mut self, flow_id: &str, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Blueprint, GraphError> {
        // 1. Indexing
        self.id_map.clear();
        for (idx, node) in nodes.iter().enumerate() {
            if self.id_map.insert(node.id.clone(), idx).is_some() {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        // 2. Referential integrity
        for edge in &edges {
            for end in [&edge.source, &edge.target] {
                if !self.id_map.contains_key(end) {
                    return Err(GraphError::DanglingEdge {
                        source_id: edge.source.clone(),
                        target_id: edge.target.clone(),
                        missing: end.clone(),
                    });
                }
            }
        }

        Ok(Blueprint::new(flow_id.to_string(), nodes, edges, self.id_map.clone()))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
