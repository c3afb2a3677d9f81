use std::collections::HashSet;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::error::EngineError;
use crate::nodes::{self, Next, VisitScope};
use crate::runtime::blueprint::Blueprint;
use crate::runtime::context::EventContext;
use crate::runtime::recorder::StepRecorder;
use crate::runtime::run::{RunMode, StepLogEntry};
use crate::runtime::storage::ActionQueue;
use crate::runtime::task::ActionJob;

/// Result of walking from one trigger
#[derive(Debug, Clone, Default)]
pub struct WalkReport {
    /// Some path halted at a gate or (live) wait
    pub waiting: bool,
    /// The run-wide step ceiling cut the walk short
    pub exhausted: bool,
    pub steps: usize,
    pub log: Vec<StepLogEntry>,
}

/// Depth-first walker for one run.
///
/// The step counter lives here and is shared by every trigger walk of the
/// run, so step indices never repeat inside a run. The visited set is reset
/// per trigger walk and keyed on node id, which bounds a walk by the node
/// count even on cyclic graphs.
pub struct Walker<'a> {
    blueprint: &'a Blueprint,
    recorder: &'a StepRecorder,
    queue: &'a dyn ActionQueue,
    org_id: &'a str,
    run_id: Uuid,
    mode: RunMode,
    ctx: &'a EventContext,
    max_steps: usize,
    next_index: u32,
}

impl<'a> Walker<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        blueprint: &'a Blueprint,
        recorder: &'a StepRecorder,
        queue: &'a dyn ActionQueue,
        org_id: &'a str,
        run_id: Uuid,
        mode: RunMode,
        ctx: &'a EventContext,
        max_steps: usize,
    ) -> Self {
        Self {
            blueprint,
            recorder,
            queue,
            org_id,
            run_id,
            mode,
            ctx,
            max_steps,
            next_index: 0,
        }
    }

    pub fn steps_taken(&self) -> u32 {
        self.next_index
    }

    pub async fn walk(&mut self, trigger_id: &str) -> Result<WalkReport, EngineError> {
        let blueprint = self.blueprint;
        let mut report = WalkReport::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<String> = vec![trigger_id.to_string()];

        while let Some(node_id) = stack.pop() {
            if !visited.insert(node_id.clone()) {
                debug!(run_id = %self.run_id, node_id = %node_id, "Node already visited in this walk, skipping");
                continue;
            }

            let Some(node) = blueprint.node(&node_id) else {
                // Compiler rejects dangling edges, so only a bad trigger id lands here
                warn!(run_id = %self.run_id, node_id = %node_id, "Node not found in graph");
                continue;
            };

            if self.next_index as usize >= self.max_steps {
                warn!(run_id = %self.run_id, max_steps = self.max_steps, "Step ceiling reached, stopping walk");
                report.exhausted = true;
                report.log.push(StepLogEntry::run_level(
                    "aborted",
                    format!("Step limit of {} reached", self.max_steps),
                ));
                break;
            }

            let scope = VisitScope {
                ctx: self.ctx,
                mode: self.mode,
                outgoing: blueprint.outgoing(&node.id),
            };
            let visit = nodes::visit(node, &scope);

            let step_index = self.next_index;
            self.next_index += 1;
            report.steps += 1;

            let step_id = self
                .recorder
                .persist_step(
                    self.org_id,
                    self.run_id,
                    &node.id,
                    step_index,
                    visit.status,
                    Some(visit.payload.clone()),
                    None,
                )
                .await?;

            if let Some(request) = &visit.approval {
                self.recorder
                    .request_approval(self.org_id, self.run_id, step_id, &request.channel, &request.body)
                    .await?;
            }

            if let Some(intent) = &visit.intent {
                self.queue
                    .push(ActionJob {
                        org_id: self.org_id.to_string(),
                        run_id: self.run_id,
                        step_id,
                        node_key: node.id.clone(),
                        action_type: intent.action_type.clone(),
                        sequence: intent.sequence.clone(),
                        event: self.ctx.clone(),
                    })
                    .await?;
            }

            let now = Utc::now();
            for line in &visit.lines {
                report.log.push(StepLogEntry {
                    node_id: Some(node.id.clone()),
                    node_type: Some(node.node_type.clone()),
                    action: line.action.clone(),
                    detail: line.detail.clone(),
                    timestamp: now,
                });
            }

            match visit.next {
                Next::Continue(targets) => {
                    // Reverse so the first edge is walked first
                    stack.extend(targets.into_iter().rev());
                }
                Next::Halt => {
                    info!(run_id = %self.run_id, node_id = %node.id, status = ?visit.status, "Walk halted");
                    report.waiting = true;
                }
                Next::Terminate => {
                    debug!(run_id = %self.run_id, node_id = %node.id, "Path terminated");
                }
            }
        }

        Ok(report)
    }
}
