use std::sync::Arc;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use crate::compiler::core::Compiler;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::runtime::blueprint::Blueprint;
use crate::runtime::context::EventContext;
use crate::runtime::recorder::StepRecorder;
use crate::runtime::run::{Flow, FlowRun, RunMode, RunOutcome, RunStatus, StepLogEntry};
use crate::runtime::storage::{
    ActionQueue, FlowRepository, InMemoryActionQueue, InMemoryRunStore, RunStore,
};
use crate::runtime::walker::Walker;

/// Direct "run this flow" request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub org_id: String,
    pub flow_id: String,
    #[serde(default)]
    pub mode: RunMode,
    pub event: EventContext,
}

impl RunRequest {
    pub fn new(org_id: &str, flow_id: &str, mode: RunMode, event: EventContext) -> Self {
        Self {
            org_id: org_id.to_string(),
            flow_id: flow_id.to_string(),
            mode,
            event,
        }
    }
}

/// Run orchestrator: picks flows for an event, opens one run per flow, walks
/// every matching trigger and settles the run status.
///
/// Runs share nothing but the stores, so the engine can be driven from many
/// tasks at once. There is no deduplication: the same event twice yields two
/// runs.
pub struct Engine {
    flows: Arc<dyn FlowRepository>,
    store: Arc<dyn RunStore>,
    queue: Arc<dyn ActionQueue>,
    recorder: StepRecorder,
    config: EngineConfig,
}

impl Engine {
    /// In-memory run store and action queue
    pub fn new(flows: Arc<dyn FlowRepository>) -> Self {
        Self::new_with_storage(
            flows,
            Arc::new(InMemoryRunStore::new()),
            Arc::new(InMemoryActionQueue::new()),
        )
    }

    pub fn new_with_storage(
        flows: Arc<dyn FlowRepository>,
        store: Arc<dyn RunStore>,
        queue: Arc<dyn ActionQueue>,
    ) -> Self {
        let config = EngineConfig::default();
        let window = chrono::TimeDelta::minutes(config.approval_window_minutes);
        Self::assemble(flows, store, queue, config, window)
    }

    /// Rejects out-of-range settings before any run can start
    pub fn with_config(
        flows: Arc<dyn FlowRepository>,
        store: Arc<dyn RunStore>,
        queue: Arc<dyn ActionQueue>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let window = config.approval_window()?;
        Ok(Self::assemble(flows, store, queue, config, window))
    }

    fn assemble(
        flows: Arc<dyn FlowRepository>,
        store: Arc<dyn RunStore>,
        queue: Arc<dyn ActionQueue>,
        config: EngineConfig,
        approval_window: chrono::TimeDelta,
    ) -> Self {
        let recorder = StepRecorder::new(store.clone(), approval_window);
        Self {
            flows,
            store,
            queue,
            recorder,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn RunStore> {
        &self.store
    }

    pub fn queue(&self) -> &Arc<dyn ActionQueue> {
        &self.queue
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Direct entry point. A missing (or soft-deleted) flow is not an error:
    /// no run is created and the outcome carries a single "skipped" entry.
    pub async fn run_flow(&self, request: RunRequest) -> Result<RunOutcome, EngineError> {
        let flow = self
            .flows
            .get_flow(&request.org_id, &request.flow_id)
            .await?
            .filter(|f| !f.is_deleted());

        let Some(flow) = flow else {
            warn!(org_id = %request.org_id, flow_id = %request.flow_id, "Flow not found");
            return Ok(RunOutcome::flow_not_found(&request.flow_id));
        };

        let blueprint = Compiler::new()
            .compile_flow(&flow)
            .map_err(|source| EngineError::Graph { flow_id: flow.id.clone(), source })?;

        self.execute(&request.org_id, &flow, &blueprint, request.mode, &request.event).await
    }

    /// Broadcast entry point: every ACTIVE flow of the org with a trigger for
    /// this event type gets its own run. Flows with unparseable graphs are
    /// skipped.
    pub async fn dispatch_event(
        &self,
        org_id: &str,
        event: &EventContext,
        mode: RunMode,
    ) -> Result<Vec<RunOutcome>, EngineError> {
        let flows = self.flows.list_active_flows(org_id).await?;
        let mut outcomes = Vec::new();

        for flow in flows {
            let blueprint = match Compiler::new().compile_flow(&flow) {
                Ok(bp) => bp,
                Err(e) => {
                    warn!(org_id, flow_id = %flow.id, error = %e, "Skipping flow with invalid graph");
                    continue;
                }
            };
            if !blueprint.has_trigger_for(&event.event_type) {
                continue;
            }
            outcomes.push(self.execute(org_id, &flow, &blueprint, mode, event).await?);
        }

        info!(org_id, event_type = %event.event_type, runs = outcomes.len(), "Event dispatched");
        Ok(outcomes)
    }

    async fn execute(
        &self,
        org_id: &str,
        flow: &Flow,
        blueprint: &Blueprint,
        mode: RunMode,
        event: &EventContext,
    ) -> Result<RunOutcome, EngineError> {
        let run = FlowRun {
            id: Uuid::new_v4(),
            flow_id: flow.id.clone(),
            org_id: org_id.to_string(),
            triggered_by: triggered_by(mode).to_string(),
            trigger_event: serde_json::to_value(event).map_err(anyhow::Error::from)?,
            status: RunStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            log: Vec::new(),
        };
        self.recorder.open_run(&run).await?;
        info!(run_id = %run.id, flow_id = %flow.id, org_id, mode = ?mode, event_type = %event.event_type, "Run started");

        let triggers = blueprint.triggers_for(&event.event_type);
        let mut log = Vec::new();
        let mut waiting = false;
        let mut exhausted = false;

        if triggers.is_empty() {
            log.push(StepLogEntry::run_level(
                "skipped",
                format!("No trigger matches event '{}'", event.event_type),
            ));
        }

        let mut walker = Walker::new(
            blueprint,
            &self.recorder,
            self.queue.as_ref(),
            org_id,
            run.id,
            mode,
            event,
            self.config.max_steps_per_run,
        );
        for trigger in triggers {
            let report = walker.walk(&trigger.id).await?;
            waiting |= report.waiting;
            exhausted |= report.exhausted;
            log.extend(report.log);
            if exhausted {
                break;
            }
        }

        let status = settle_status(mode, waiting, exhausted);
        self.recorder.close_run(org_id, run.id, status, &log).await?;
        info!(run_id = %run.id, status = ?status, steps = walker.steps_taken(), "Run settled");

        Ok(RunOutcome {
            flow_id: flow.id.clone(),
            run_id: Some(run.id),
            status: Some(status),
            log,
        })
    }
}

fn triggered_by(mode: RunMode) -> &'static str {
    match mode {
        RunMode::Live => "event",
        RunMode::DryRun => "dry_run",
    }
}

/// Dry runs always settle as DRY_RUN. A live run still parked at a gate or
/// wait stays RUNNING until an external re-invocation.
pub fn settle_status(mode: RunMode, waiting: bool, exhausted: bool) -> RunStatus {
    match mode {
        RunMode::DryRun => RunStatus::DryRun,
        RunMode::Live if exhausted => RunStatus::Failed,
        RunMode::Live if waiting => RunStatus::Running,
        RunMode::Live => RunStatus::Completed,
    }
}
