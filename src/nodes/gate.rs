use serde_json::{json, Value};
use crate::dsl::{ApprovalData, InteractiveData, WaitData};
use crate::nodes::flow::keyed_targets;
use crate::nodes::{all_targets, ApprovalRequest, Next, Visit, VisitScope};
use crate::runtime::condition::display_number;
use crate::runtime::run::StepStatus;

const DEFAULT_APPROVAL_CHANNEL: &str = "email";

/// Human-in-the-loop gate. Halts in every mode.
pub fn approval(data: &ApprovalData, _scope: &VisitScope) -> Visit {
    let channel = data
        .channel
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_APPROVAL_CHANNEL.to_string());
    let body = data.message.clone().unwrap_or_default();

    let mut visit = Visit::new(
        StepStatus::WaitingApproval,
        json!({ "requestedChannel": channel, "requestBody": body }),
        Next::Halt,
    )
    .line("waiting_approval", format!("Approval requested via {}", channel));
    visit.approval = Some(ApprovalRequest { channel, body });
    visit
}

/// Pauses until a response addressed to this node arrives, then routes on
/// `responseBranchMap[value]`, falling back to `defaultBranch`.
pub fn interactive(node_id: &str, data: &InteractiveData, scope: &VisitScope) -> Visit {
    let response = scope
        .ctx
        .interactive_response
        .as_ref()
        .filter(|r| r.node_key == node_id);

    let Some(response) = response else {
        return Visit::new(
            StepStatus::Pending,
            json!({ "prompt": data.prompt }),
            Next::Halt,
        )
        .line("waiting_response", "Awaiting interactive response");
    };

    let branch = data
        .response_branch_map
        .get(&response.value)
        .or(data.default_branch.as_ref())
        .cloned();
    let targets = branch
        .as_deref()
        .map(|key| keyed_targets(&scope.outgoing, key))
        .unwrap_or_default();

    let detail = match &branch {
        Some(key) => format!("Response '{}' routed to branch '{}'", response.value, key),
        None => format!("Response '{}' matched no branch", response.value),
    };
    Visit::new(
        StepStatus::Completed,
        json!({
            "response": response.value,
            "rawText": response.raw_text,
            "branch": branch,
        }),
        Next::Continue(targets),
    )
    .line("responded", detail)
}

/// Timed delay. Live walks stop here; dry runs pass straight through.
pub fn wait(data: &WaitData, scope: &VisitScope) -> Visit {
    let duration = duration_text(&data.duration);
    let unit = if data.unit.is_empty() { "hours" } else { data.unit.as_str() };
    let payload = json!({ "duration": data.duration, "unit": unit });

    if scope.mode.is_dry_run() {
        Visit::new(StepStatus::Completed, payload, Next::Continue(all_targets(scope)))
            .line("waited", format!("[DRY-RUN] Would wait {} {}", duration, unit))
    } else {
        Visit::new(StepStatus::Pending, payload, Next::Halt)
            .line("waiting", format!("Waiting {} {}", duration, unit))
    }
}

fn duration_text(duration: &Value) -> String {
    match duration {
        Value::Number(n) => n.as_f64().map(display_number).unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.trim().to_string(),
        Value::Null => "1".to_string(),
        other => other.to_string(),
    }
}
