use dunflow::dsl::builder::branch;
use dunflow::dsl::{Condition, Field, Operator};
use dunflow::runtime::condition::{display_number, evaluate, evaluate_condition};
use dunflow::runtime::context::EventContext;
use serde_json::{json, Value};

fn cond(field: Field, operator: Operator, value: Value) -> Condition {
    Condition { field, operator, value }
}

fn overdue() -> EventContext {
    EventContext::new("org_1", "Invoice Overdue")
}

#[test]
fn test_numeric_comparisons() {
    let ctx = overdue().with_amount(1500.0).with_days_overdue(10.0);

    assert!(evaluate_condition(&cond(Field::Amount, Operator::Gt, json!(1000)), &ctx));
    assert!(!evaluate_condition(&cond(Field::Amount, Operator::Lt, json!(1000)), &ctx));
    assert!(evaluate_condition(&cond(Field::Amount, Operator::Eq, json!(1500)), &ctx));
    assert!(evaluate_condition(&cond(Field::DaysOverdue, Operator::Gt, json!(7)), &ctx));
    assert!(!evaluate_condition(&cond(Field::DaysOverdue, Operator::Gt, json!(30)), &ctx));
}

#[test]
fn test_numeric_strings_are_coerced() {
    let ctx = overdue().with_amount(1500.0);

    assert!(evaluate_condition(&cond(Field::Amount, Operator::Gt, json!("1000")), &ctx));
    assert!(evaluate_condition(&cond(Field::Amount, Operator::Eq, json!(" 1500 ")), &ctx));
    assert!(evaluate_condition(&cond(Field::Amount, Operator::Eq, json!("1500.0")), &ctx));
}

#[test]
fn test_missing_data_never_matches() {
    let ctx = overdue();

    assert!(!evaluate_condition(&cond(Field::Amount, Operator::Gt, json!(0)), &ctx));
    assert!(!evaluate_condition(&cond(Field::Amount, Operator::Lt, json!(0)), &ctx));
    assert!(!evaluate_condition(&cond(Field::DaysOverdue, Operator::Eq, json!(0)), &ctx));
    assert!(!evaluate_condition(&cond(Field::Tag, Operator::Contains, json!("vip")), &ctx));
    assert!(!evaluate_condition(&cond(Field::Tag, Operator::Eq, json!("")), &ctx));
}

#[test]
fn test_non_numeric_value_falls_back_to_strings() {
    let ctx = overdue().with_amount(1500.0);

    // ">" has no string semantics
    assert!(!evaluate_condition(&cond(Field::Amount, Operator::Gt, json!("abc")), &ctx));
    assert!(!evaluate_condition(&cond(Field::Amount, Operator::Eq, json!("abc")), &ctx));
    assert!(evaluate_condition(&cond(Field::Amount, Operator::Contains, json!("50")), &ctx));
    assert!(!evaluate_condition(&cond(Field::Amount, Operator::Contains, json!("99")), &ctx));
}

#[test]
fn test_tag_contains_is_case_insensitive_substring() {
    let ctx = overdue().with_tags(&["Enterprise", "VIP-Gold"]);

    assert!(evaluate_condition(&cond(Field::Tag, Operator::Contains, json!("vip")), &ctx));
    assert!(evaluate_condition(&cond(Field::Tag, Operator::Contains, json!("PRISE")), &ctx));
    assert!(!evaluate_condition(&cond(Field::Tag, Operator::Contains, json!("smb")), &ctx));
    assert!(!evaluate_condition(&cond(Field::Tag, Operator::Contains, Value::Null), &ctx));
}

#[test]
fn test_tag_equality_uses_joined_tags() {
    let ctx = overdue().with_tags(&["a", "b"]);

    assert!(evaluate_condition(&cond(Field::Tag, Operator::Eq, json!("a,b")), &ctx));
    assert!(!evaluate_condition(&cond(Field::Tag, Operator::Eq, json!("a")), &ctx));
    assert!(!evaluate_condition(&cond(Field::Tag, Operator::Gt, json!("a")), &ctx));
}

#[test]
fn test_unknown_field_or_operator_fails_closed() {
    let ctx = overdue().with_amount(10.0).with_tags(&["x"]);

    assert!(!evaluate_condition(&cond(Field::Unknown, Operator::Eq, json!(10)), &ctx));
    assert!(!evaluate_condition(&cond(Field::Amount, Operator::Unknown, json!(10)), &ctx));
    assert!(!evaluate_condition(&cond(Field::Tag, Operator::Unknown, json!("x")), &ctx));
}

#[test]
fn test_evaluation_is_deterministic() {
    let ctx = overdue().with_amount(2000.0);
    let b = branch("big", Field::Amount, Operator::Gt, 1000);

    let first = evaluate(&b, &ctx);
    for _ in 0..10 {
        assert_eq!(evaluate(&b, &ctx), first);
    }
    assert!(first);
}

#[test]
fn test_display_number() {
    assert_eq!(display_number(24.0), "24");
    assert_eq!(display_number(1.5), "1.5");
    assert_eq!(display_number(-3.0), "-3");
}
