use thiserror::Error;

/// Structural problems in a stored `{nodes, edges}` graph
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("malformed {what}: {source}")]
    Malformed {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("edge {source_id} -> {target_id} references unknown node {missing}")]
    DanglingEdge {
        source_id: String,
        target_id: String,
        missing: String,
    },
}

/// Engine settings outside their accepted range
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("approval_window_minutes must be between 1 and {max}, got {got}")]
    ApprovalWindow { got: i64, max: i64 },

    #[error("max_steps_per_run must be at least 1")]
    ZeroStepCeiling,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid graph for flow {flow_id}: {source}")]
    Graph {
        flow_id: String,
        #[source]
        source: GraphError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Persistence or queue failure. Never retried by the engine.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
