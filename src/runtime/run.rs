use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStatus {
    #[default]
    Draft,
    Active,
    Paused,
    Archived,
}

/// A stored flow definition. The graph is kept as opaque JSON, exactly as
/// the builder UI wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: String,
    pub org_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: FlowStatus,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(alias = "nodes", default)]
    pub nodes_json: Value,
    #[serde(alias = "edges", default)]
    pub edges_json: Value,
}

impl Flow {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_runnable(&self) -> bool {
        self.status == FlowStatus::Active && !self.is_deleted()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    #[default]
    Live,
    DryRun,
}

impl RunMode {
    pub fn is_dry_run(self) -> bool {
        self == RunMode::DryRun
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    DryRun,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

/// One human-readable line of a run's log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepLogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    pub action: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

impl StepLogEntry {
    /// Entry not tied to a node (e.g. "Flow not found")
    pub fn run_level(action: &str, detail: impl Into<String>) -> Self {
        Self {
            node_id: None,
            node_type: None,
            action: action.to_string(),
            detail: detail.into(),
            timestamp: Utc::now(),
        }
    }
}

/// One execution attempt of a flow against one event. Never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRun {
    pub id: Uuid,
    pub flow_id: String,
    pub org_id: String,
    pub triggered_by: String,
    pub trigger_event: Value,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub log: Vec<StepLogEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    Pending,
    Running,
    WaitingApproval,
    Completed,
    Failed,
    Skipped,
}

impl StepStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed | StepStatus::Skipped)
    }
}

/// Append-only record of one node visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRunStep {
    pub id: Uuid,
    pub org_id: String,
    pub flow_run_id: Uuid,
    pub node_key: String,
    pub step_index: u32,
    pub status: StepStatus,
    pub payload: Option<Value>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalDecision {
    Pending,
    Approved,
    Denied,
    Skipped,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowApproval {
    pub id: Uuid,
    pub org_id: String,
    pub flow_run_id: Uuid,
    pub flow_run_step_id: Uuid,
    pub requested_channel: String,
    pub request_body: String,
    pub decision: ApprovalDecision,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// What a caller gets back from one direct run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub flow_id: String,
    /// `None` when no run was created (flow not found)
    pub run_id: Option<Uuid>,
    pub status: Option<RunStatus>,
    pub log: Vec<StepLogEntry>,
}

impl RunOutcome {
    pub fn flow_not_found(flow_id: &str) -> Self {
        Self {
            flow_id: flow_id.to_string(),
            run_id: None,
            status: None,
            log: vec![StepLogEntry::run_level("skipped", "Flow not found")],
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == Some(RunStatus::Running)
    }
}
