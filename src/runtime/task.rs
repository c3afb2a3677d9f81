use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use crate::runtime::context::EventContext;

/// Delivery intent left by a live action node. The engine only enqueues it;
/// a messaging worker outside this crate picks it up and delivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionJob {
    pub org_id: String,
    pub run_id: Uuid,
    /// The step row this job belongs to
    pub step_id: Uuid,
    pub node_key: String,
    pub action_type: String,
    pub sequence: Option<Value>,
    pub event: EventContext,
}
