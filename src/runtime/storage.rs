use async_trait::async_trait;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use crate::runtime::run::{Flow, FlowRun, RunStatus, StepLogEntry, WorkflowApproval, WorkflowRunStep};
use crate::runtime::task::ActionJob;
use anyhow::{Result, anyhow};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{mpsc, Mutex};

// --- Interfaces ---

/// Read side of flow definitions. Every lookup is scoped by org.
#[async_trait]
pub trait FlowRepository: Send + Sync {
    async fn get_flow(&self, org_id: &str, flow_id: &str) -> Result<Option<Flow>>;
    /// ACTIVE, non-deleted flows of the org
    async fn list_active_flows(&self, org_id: &str) -> Result<Vec<Flow>>;
}

/// Run/step/approval persistence sink. Steps and approvals are append-only.
#[async_trait]
pub trait RunStore: Send + Sync {
    async fn insert_run(&self, run: &FlowRun) -> Result<()>;
    async fn update_run(
        &self,
        org_id: &str,
        run_id: Uuid,
        status: RunStatus,
        log: &[StepLogEntry],
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<()>;
    async fn insert_step(&self, step: &WorkflowRunStep) -> Result<()>;
    async fn insert_approval(&self, approval: &WorkflowApproval) -> Result<()>;

    async fn get_run(&self, org_id: &str, run_id: Uuid) -> Result<Option<FlowRun>>;
    /// Steps of a run ordered by step index
    async fn list_steps(&self, org_id: &str, run_id: Uuid) -> Result<Vec<WorkflowRunStep>>;
    async fn list_approvals(&self, org_id: &str, run_id: Uuid) -> Result<Vec<WorkflowApproval>>;
}

/// Hand-off point to the external delivery worker
#[async_trait]
pub trait ActionQueue: Send + Sync {
    async fn push(&self, job: ActionJob) -> Result<()>;
    /// `None` when nothing is queued
    async fn pop(&self) -> Result<Option<ActionJob>>;
}

// --- In-Memory Implementations ---

#[derive(Default)]
pub struct InMemoryFlowRepository {
    flows: DashMap<String, Flow>,
}

impl InMemoryFlowRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flows(flows: impl IntoIterator<Item = Flow>) -> Self {
        let repo = Self::new();
        for flow in flows {
            repo.insert(flow);
        }
        repo
    }

    /// Inserts or replaces a flow (the builder UI editing it)
    pub fn insert(&self, flow: Flow) {
        self.flows.insert(flow.id.clone(), flow);
    }
}

#[async_trait]
impl FlowRepository for InMemoryFlowRepository {
    async fn get_flow(&self, org_id: &str, flow_id: &str) -> Result<Option<Flow>> {
        Ok(self
            .flows
            .get(flow_id)
            .filter(|f| f.org_id == org_id)
            .map(|f| f.value().clone()))
    }

    async fn list_active_flows(&self, org_id: &str) -> Result<Vec<Flow>> {
        let mut flows: Vec<Flow> = self
            .flows
            .iter()
            .filter(|f| f.org_id == org_id && f.is_runnable())
            .map(|f| f.value().clone())
            .collect();
        // DashMap iteration order is arbitrary
        flows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(flows)
    }
}

#[derive(Default)]
pub struct InMemoryRunStore {
    runs: DashMap<Uuid, FlowRun>,
    // Map<RunID, Steps>
    steps: DashMap<Uuid, Vec<WorkflowRunStep>>,
    // Map<RunID, Approvals>
    approvals: DashMap<Uuid, Vec<WorkflowApproval>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn insert_run(&self, run: &FlowRun) -> Result<()> {
        match self.runs.entry(run.id) {
            Entry::Occupied(_) => Err(anyhow!("Run already exists: {}", run.id)),
            Entry::Vacant(slot) => {
                slot.insert(run.clone());
                Ok(())
            }
        }
    }

    async fn update_run(
        &self,
        org_id: &str,
        run_id: Uuid,
        status: RunStatus,
        log: &[StepLogEntry],
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut run = self
            .runs
            .get_mut(&run_id)
            .filter(|r| r.org_id == org_id)
            .ok_or_else(|| anyhow!("Run not found: {}", run_id))?;
        run.status = status;
        run.log = log.to_vec();
        run.completed_at = completed_at;
        Ok(())
    }

    async fn insert_step(&self, step: &WorkflowRunStep) -> Result<()> {
        self.steps.entry(step.flow_run_id).or_default().push(step.clone());
        Ok(())
    }

    async fn insert_approval(&self, approval: &WorkflowApproval) -> Result<()> {
        self.approvals.entry(approval.flow_run_id).or_default().push(approval.clone());
        Ok(())
    }

    async fn get_run(&self, org_id: &str, run_id: Uuid) -> Result<Option<FlowRun>> {
        Ok(self
            .runs
            .get(&run_id)
            .filter(|r| r.org_id == org_id)
            .map(|r| r.value().clone()))
    }

    async fn list_steps(&self, org_id: &str, run_id: Uuid) -> Result<Vec<WorkflowRunStep>> {
        let mut steps: Vec<WorkflowRunStep> = self
            .steps
            .get(&run_id)
            .map(|s| s.value().iter().filter(|s| s.org_id == org_id).cloned().collect())
            .unwrap_or_default();
        steps.sort_by_key(|s| s.step_index);
        Ok(steps)
    }

    async fn list_approvals(&self, org_id: &str, run_id: Uuid) -> Result<Vec<WorkflowApproval>> {
        Ok(self
            .approvals
            .get(&run_id)
            .map(|a| a.value().iter().filter(|a| a.org_id == org_id).cloned().collect())
            .unwrap_or_default())
    }
}

pub struct InMemoryActionQueue {
    sender: mpsc::UnboundedSender<ActionJob>,
    receiver: Mutex<mpsc::UnboundedReceiver<ActionJob>>,
}

impl InMemoryActionQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sender: tx,
            receiver: Mutex::new(rx),
        }
    }
}

impl Default for InMemoryActionQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionQueue for InMemoryActionQueue {
    async fn push(&self, job: ActionJob) -> Result<()> {
        self.sender.send(job).map_err(|e| anyhow!("Action channel closed: {}", e))
    }

    async fn pop(&self) -> Result<Option<ActionJob>> {
        let mut rx = self.receiver.lock().await;
        Ok(rx.try_recv().ok())
    }
}
