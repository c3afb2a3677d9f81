use serde_json::json;
use crate::dsl::{ExitData, TriggerData};
use crate::nodes::{all_targets, Next, Visit, VisitScope};
use crate::runtime::run::StepStatus;

/// Entry point. Callers only start walks at triggers matching the event, so
/// this just records the hit and fans out to every edge.
pub fn trigger(data: &TriggerData, scope: &VisitScope) -> Visit {
    Visit::new(
        StepStatus::Completed,
        json!({ "triggerType": data.trigger_type, "eventType": scope.ctx.event_type }),
        Next::Continue(all_targets(scope)),
    )
    .line("triggered", format!("Triggered by {}", scope.ctx.event_type))
}

/// Ends the path regardless of outgoing edges
pub fn exit(data: &ExitData) -> Visit {
    let reason = data.reason.clone().unwrap_or_else(|| "Flow exited".to_string());
    Visit::new(StepStatus::Completed, json!({ "reason": reason }), Next::Terminate)
        .line("exited", reason)
}
