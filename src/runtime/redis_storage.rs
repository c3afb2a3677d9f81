use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::runtime::run::{FlowRun, RunStatus, StepLogEntry, WorkflowApproval, WorkflowRunStep};
use crate::runtime::storage::{ActionQueue, RunStore};
use crate::runtime::task::ActionJob;
use anyhow::{Result, anyhow};
use redis::AsyncCommands;

pub struct RedisActionQueue {
    client: redis::Client,
    queue_key: String,
}

impl RedisActionQueue {
    pub fn new(client: redis::Client, queue_key: String) -> Self {
        Self {
            client,
            queue_key,
        }
    }
}

#[async_trait]
impl ActionQueue for RedisActionQueue {
    async fn push(&self, job: ActionJob) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let serialized = serde_json::to_string(&job)?;
        let _: () = conn.lpush(&self.queue_key, serialized).await?;
        Ok(())
    }

    async fn pop(&self) -> Result<Option<ActionJob>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        // Short block so callers stay responsive to shutdown
        let result: Option<(String, String)> = conn.brpop(&self.queue_key, 1.0).await?;

        match result {
            Some((_, job_json)) => Ok(Some(serde_json::from_str(&job_json)?)),
            None => Ok(None),
        }
    }
}

/// Runs as JSON strings, steps and approvals as JSON lists. Every key carries
/// the org so runs of different orgs never share a key.
pub struct RedisRunStore {
    client: redis::Client,
}

impl RedisRunStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn run_key(&self, org_id: &str, run_id: Uuid) -> String {
        format!("dunflow:org:{}:run:{}", org_id, run_id)
    }

    fn steps_key(&self, org_id: &str, run_id: Uuid) -> String {
        format!("dunflow:org:{}:run:{}:steps", org_id, run_id)
    }

    fn approvals_key(&self, org_id: &str, run_id: Uuid) -> String {
        format!("dunflow:org:{}:run:{}:approvals", org_id, run_id)
    }

    async fn read_list<T: serde::de::DeserializeOwned>(&self, key: String) -> Result<Vec<T>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Vec<String> = conn.lrange(key, 0, -1).await?;
        raw.iter()
            .map(|s| serde_json::from_str(s).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl RunStore for RedisRunStore {
    async fn insert_run(&self, run: &FlowRun) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let serialized = serde_json::to_string(run)?;
        let created: bool = conn.set_nx(self.run_key(&run.org_id, run.id), serialized).await?;
        if !created {
            return Err(anyhow!("Run already exists: {}", run.id));
        }
        Ok(())
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
            .get_run(org_id, run_id)
            .await?
            .ok_or_else(|| anyhow!("Run not found: {}", run_id))?;
        run.status = status;
        run.log = log.to_vec();
        run.completed_at = completed_at;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let serialized = serde_json::to_string(&run)?;
        let _: () = conn.set(self.run_key(org_id, run_id), serialized).await?;
        Ok(())
    }

    async fn insert_step(&self, step: &WorkflowRunStep) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let serialized = serde_json::to_string(step)?;
        let _: () = conn.rpush(self.steps_key(&step.org_id, step.flow_run_id), serialized).await?;
        Ok(())
    }

    async fn insert_approval(&self, approval: &WorkflowApproval) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let serialized = serde_json::to_string(approval)?;
        let _: () = conn
            .rpush(self.approvals_key(&approval.org_id, approval.flow_run_id), serialized)
            .await?;
        Ok(())
    }

    async fn get_run(&self, org_id: &str, run_id: Uuid) -> Result<Option<FlowRun>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(self.run_key(org_id, run_id)).await?;
        match raw {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    async fn list_steps(&self, org_id: &str, run_id: Uuid) -> Result<Vec<WorkflowRunStep>> {
        let mut steps: Vec<WorkflowRunStep> = self.read_list(self.steps_key(org_id, run_id)).await?;
        steps.sort_by_key(|s| s.step_index);
        Ok(steps)
    }

    async fn list_approvals(&self, org_id: &str, run_id: Uuid) -> Result<Vec<WorkflowApproval>> {
        self.read_list(self.approvals_key(org_id, run_id)).await
    }
}
