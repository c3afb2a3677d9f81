//! Per-kind node handlers.
//!
//! A handler never touches storage. It inspects the node, the event and the
//! node's outgoing edges and returns a [`Visit`]; the walker persists the
//! step and applies the [`Next`] decision.

pub mod action;
pub mod common;
pub mod flow;
pub mod gate;

use serde_json::Value;
use crate::dsl::{Edge, Node, NodeKind};
use crate::runtime::context::EventContext;
use crate::runtime::run::{RunMode, StepStatus};

/// Everything a handler may look at
pub struct VisitScope<'a> {
    pub ctx: &'a EventContext,
    pub mode: RunMode,
    pub outgoing: Vec<&'a Edge>,
}

/// How the walk continues after a node
#[derive(Debug, Clone, PartialEq)]
pub enum Next {
    /// Walk these target node ids depth-first, in order. May be empty.
    Continue(Vec<String>),
    /// Path pauses until an external re-invocation
    Halt,
    /// Path ends for good
    Terminate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub action: String,
    pub detail: String,
}

impl LogLine {
    pub fn new(action: &str, detail: impl Into<String>) -> Self {
        Self { action: action.to_string(), detail: detail.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalRequest {
    pub channel: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionIntent {
    pub action_type: String,
    pub sequence: Option<Value>,
}

/// Outcome of visiting one node
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub status: StepStatus,
    pub payload: Value,
    pub lines: Vec<LogLine>,
    pub next: Next,
    pub approval: Option<ApprovalRequest>,
    pub intent: Option<ActionIntent>,
}

impl Visit {
    pub fn new(status: StepStatus, payload: Value, next: Next) -> Self {
        Self {
            status,
            payload,
            lines: Vec::new(),
            next,
            approval: None,
            intent: None,
        }
    }

    pub fn line(mut self, action: &str, detail: impl Into<String>) -> Self {
        self.lines.push(LogLine::new(action, detail));
        self
    }

    pub fn is_halt(&self) -> bool {
        self.next == Next::Halt
    }
}

pub fn visit(node: &Node, scope: &VisitScope) -> Visit {
    match &node.kind {
        NodeKind::Trigger(data) => common::trigger(data, scope),
        NodeKind::Switch(data) => flow::switch(data, scope),
        NodeKind::Approval(data) => gate::approval(data, scope),
        NodeKind::Interactive(data) => gate::interactive(&node.id, data, scope),
        NodeKind::Wait(data) => gate::wait(data, scope),
        NodeKind::Exit(data) => common::exit(data),
        NodeKind::Action(data) => action::action(&node.node_type, data, scope),
    }
}

/// Targets of every outgoing edge, in stored order
pub(crate) fn all_targets(scope: &VisitScope) -> Vec<String> {
    scope.outgoing.iter().map(|e| e.target.clone()).collect()
}
