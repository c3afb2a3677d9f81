use serde::{Deserialize, Serialize};

/// The business event a walk is evaluated against. Immutable for the
/// lifetime of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    pub org_id: String,
    /// Open enumeration, e.g. "Invoice Overdue"
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_tags: Option<Vec<String>>,
    /// Only meaningful when replaying a walk that halted at an interactive node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive_response: Option<InteractiveResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_decision: Option<ApprovalDecisionInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveResponse {
    pub node_key: String,
    pub value: String,
    #[serde(default)]
    pub raw_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDecisionInput {
    pub node_key: String,
    pub decision: String,
    #[serde(default)]
    pub decision_body: Option<String>,
}

impl EventContext {
    pub fn new(org_id: &str, event_type: &str) -> Self {
        Self {
            org_id: org_id.to_string(),
            event_type: event_type.to_string(),
            ..Default::default()
        }
    }

    pub fn with_invoice(mut self, invoice_id: &str) -> Self {
        self.invoice_id = Some(invoice_id.to_string());
        self
    }

    pub fn with_contact(mut self, contact_id: &str) -> Self {
        self.contact_id = Some(contact_id.to_string());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_days_overdue(mut self, days: f64) -> Self {
        self.days_overdue = Some(days);
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.contact_tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_interactive_response(mut self, node_key: &str, value: &str) -> Self {
        self.interactive_response = Some(InteractiveResponse {
            node_key: node_key.to_string(),
            value: value.to_string(),
            raw_text: Some(value.to_string()),
        });
        self
    }

    pub fn with_approval_decision(mut self, node_key: &str, decision: &str) -> Self {
        self.approval_decision = Some(ApprovalDecisionInput {
            node_key: node_key.to_string(),
            decision: decision.to_string(),
            decision_body: None,
        });
        self
    }
}
