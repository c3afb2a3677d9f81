use std::sync::Arc;
use anyhow::{anyhow, Result};
use chrono::Utc;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;
use crate::runtime::run::{
    ApprovalDecision, FlowRun, RunStatus, StepLogEntry, StepStatus, WorkflowApproval, WorkflowRunStep,
};
use crate::runtime::storage::RunStore;

/// Writes run, step and approval rows. Steps are only ever inserted.
pub struct StepRecorder {
    store: Arc<dyn RunStore>,
    approval_window: chrono::Duration,
}

impl StepRecorder {
    pub fn new(store: Arc<dyn RunStore>, approval_window: chrono::Duration) -> Self {
        Self { store, approval_window }
    }

    pub async fn open_run(&self, run: &FlowRun) -> Result<()> {
        self.store.insert_run(run).await
    }

    /// Final status update. `completedAt` is stamped for terminal statuses only.
    pub async fn close_run(&self, org_id: &str, run_id: Uuid, status: RunStatus, log: &[StepLogEntry]) -> Result<()> {
        let completed_at = status.is_terminal().then(Utc::now);
        self.store.update_run(org_id, run_id, status, log, completed_at).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn persist_step(
        &self,
        org_id: &str,
        run_id: Uuid,
        node_key: &str,
        step_index: u32,
        status: StepStatus,
        payload: Option<Value>,
        error: Option<String>,
    ) -> Result<Uuid> {
        let now = Utc::now();
        let step = WorkflowRunStep {
            id: Uuid::new_v4(),
            org_id: org_id.to_string(),
            flow_run_id: run_id,
            node_key: node_key.to_string(),
            step_index,
            status,
            payload,
            error,
            started_at: now,
            completed_at: status.is_terminal().then_some(now),
        };
        self.store.insert_step(&step).await?;
        debug!(run_id = %run_id, node_id = node_key, step_index, status = ?status, "Step recorded");
        Ok(step.id)
    }

    /// Opens a PENDING approval expiring after the configured window
    pub async fn request_approval(
        &self,
        org_id: &str,
        run_id: Uuid,
        step_id: Uuid,
        channel: &str,
        body: &str,
    ) -> Result<WorkflowApproval> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.approval_window)
            .ok_or_else(|| anyhow!("Approval expiry out of range for run {}", run_id))?;
        let approval = WorkflowApproval {
            id: Uuid::new_v4(),
            org_id: org_id.to_string(),
            flow_run_id: run_id,
            flow_run_step_id: step_id,
            requested_channel: channel.to_string(),
            request_body: body.to_string(),
            decision: ApprovalDecision::Pending,
            created_at: now,
            expires_at,
        };
        self.store.insert_approval(&approval).await?;
        debug!(run_id = %run_id, step_id = %step_id, channel, "Approval requested");
        Ok(approval)
    }
}
