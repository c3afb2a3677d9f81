//! Branch predicates of switch nodes.
//!
//! Evaluation is fail-closed: missing event data, unknown fields or
//! operators, and values that do not coerce all yield `false`.

use serde_json::Value;
use crate::dsl::{Branch, Condition, Field, Operator};
use crate::runtime::context::EventContext;

pub fn evaluate(branch: &Branch, ctx: &EventContext) -> bool {
    evaluate_condition(&branch.condition, ctx)
}

pub fn evaluate_condition(condition: &Condition, ctx: &EventContext) -> bool {
    let actual = match condition.field {
        Field::Amount => ctx.amount.map(Value::from),
        Field::DaysOverdue => ctx.days_overdue.map(Value::from),
        Field::Tag => {
            let Some(tags) = &ctx.contact_tags else {
                return false;
            };
            if condition.operator == Operator::Contains {
                let Some(needle) = as_text(&condition.value) else {
                    return false;
                };
                let needle = needle.to_lowercase();
                return tags.iter().any(|tag| tag.to_lowercase().contains(&needle));
            }
            Some(Value::String(tags.join(",")))
        }
        Field::Unknown => None,
    };

    let Some(actual) = actual else {
        return false;
    };

    if let (Some(a), Some(b)) = (as_number(&actual), as_number(&condition.value)) {
        match condition.operator {
            Operator::Gt => return a > b,
            Operator::Lt => return a < b,
            Operator::Eq => return a == b,
            Operator::Contains | Operator::Unknown => {}
        }
    }

    let (Some(a), Some(b)) = (as_text(&actual), as_text(&condition.value)) else {
        return false;
    };
    match condition.operator {
        Operator::Eq => a == b,
        Operator::Contains => a.contains(&b),
        Operator::Gt | Operator::Lt | Operator::Unknown => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n.as_f64().map(display_number),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Integral values print without a fractional part ("1000", not "1000.0")
pub fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
