use serde_json::{json, Value};
use crate::dsl::{Branch, Edge, SwitchData};
use crate::nodes::{Next, Visit, VisitScope};
use crate::runtime::condition;
use crate::runtime::run::StepStatus;

/// First-match branch selection.
///
/// Branches after the selected one are never evaluated. Without a match the
/// step is SKIPPED and only the unmarked default edge (if any) is followed.
pub fn switch(data: &SwitchData, scope: &VisitScope) -> Visit {
    let mut selected: Option<&Branch> = None;
    let mut evaluations: Vec<Value> = Vec::with_capacity(data.branches.len());
    let mut lines = Vec::with_capacity(data.branches.len() + 1);

    for branch in &data.branches {
        let label = branch_label(branch);
        if selected.is_some() {
            evaluations.push(json!({ "branchId": branch.id, "result": "skipped" }));
            lines.push(("skipped", format!("Branch '{}' skipped", label)));
            continue;
        }
        if condition::evaluate(branch, scope.ctx) {
            evaluations.push(json!({ "branchId": branch.id, "result": "matched" }));
            lines.push(("matched", format!("Branch '{}' matched", label)));
            selected = Some(branch);
        } else {
            evaluations.push(json!({ "branchId": branch.id, "result": "not_matched" }));
            lines.push(("not_matched", format!("Branch '{}' did not match", label)));
        }
    }

    let mut visit = match selected {
        Some(branch) => {
            let targets = keyed_or_default(&scope.outgoing, &branch.id);
            Visit::new(
                StepStatus::Completed,
                json!({ "selectedBranch": branch.id, "branchName": branch.name, "evaluations": evaluations }),
                Next::Continue(targets),
            )
        }
        None => {
            let targets = default_targets(&scope.outgoing);
            let detail = if targets.is_empty() {
                "No branch matched"
            } else {
                "No branch matched, following default path"
            };
            lines.push(("skipped", detail.to_string()));
            Visit::new(
                StepStatus::Skipped,
                json!({ "selectedBranch": Value::Null, "evaluations": evaluations }),
                Next::Continue(targets),
            )
        }
    };

    for (action, detail) in lines {
        visit = visit.line(action, detail);
    }
    visit
}

fn branch_label(branch: &Branch) -> &str {
    if branch.name.is_empty() { &branch.id } else { &branch.name }
}

/// Targets of edges whose handle equals `key`
pub fn keyed_targets(outgoing: &[&Edge], key: &str) -> Vec<String> {
    outgoing
        .iter()
        .filter(|e| e.handle() == Some(key))
        .map(|e| e.target.clone())
        .collect()
}

/// Targets of the unmarked edges
pub fn default_targets(outgoing: &[&Edge]) -> Vec<String> {
    outgoing
        .iter()
        .filter(|e| e.is_default())
        .map(|e| e.target.clone())
        .collect()
}

pub fn keyed_or_default(outgoing: &[&Edge], key: &str) -> Vec<String> {
    let keyed = keyed_targets(outgoing, key);
    if keyed.is_empty() { default_targets(outgoing) } else { keyed }
}
