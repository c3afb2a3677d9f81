use serde_json::json;
use crate::dsl::ActionData;
use crate::nodes::{all_targets, ActionIntent, Next, Visit, VisitScope};
use crate::runtime::run::StepStatus;

/// Records the intent to act. Delivery always happens outside the engine:
/// live walks hand an [`ActionIntent`] to the walker for enqueueing, dry
/// runs only log what would have been done.
pub fn action(node_type: &str, data: &ActionData, scope: &VisitScope) -> Visit {
    let action_type = data
        .action_type
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default_action_type(node_type));
    let sequence = data.sequence.clone();
    let payload = json!({ "sequence": sequence, "actionType": action_type });
    let next = Next::Continue(all_targets(scope));

    if scope.mode.is_dry_run() {
        return Visit::new(StepStatus::Completed, payload, next)
            .line("executed", format!("[DRY-RUN] Action '{}' executed", action_type));
    }

    let mut visit = Visit::new(StepStatus::Completed, payload, next)
        .line("enqueued", format!("Action '{}' enqueued", action_type));
    visit.intent = Some(ActionIntent { action_type, sequence });
    visit
}

fn default_action_type(node_type: &str) -> String {
    match node_type.strip_prefix("action-") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ if node_type.is_empty() => "action".to_string(),
        _ => node_type.to_string(),
    }
}
