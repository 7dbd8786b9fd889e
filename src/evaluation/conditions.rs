use crate::evaluation::context::{AttributeValue, EvaluationContext};
use crate::rules::{Condition, ConditionValue, Operator};

/// Matches a single condition against a context.
///
/// Comparisons are strictly typed: a number never equals a string, and an
/// operator applied to the wrong shape of value simply does not match.
pub fn match_condition(condition: &Condition, context: &EvaluationContext) -> bool {
    let actual = match context.attribute(&condition.attribute) {
        Some(value) => value,
        None => return condition.operator.matches_absent(),
    };
    let expected = &condition.value;

    match condition.operator {
        Operator::Eq => strict_eq(&actual, expected),
        Operator::Neq => !strict_eq(&actual, expected),
        Operator::Gt => compare_numbers(&actual, expected, |a, b| a > b),
        Operator::Gte => compare_numbers(&actual, expected, |a, b| a >= b),
        Operator::Lt => compare_numbers(&actual, expected, |a, b| a < b),
        Operator::Lte => compare_numbers(&actual, expected, |a, b| a <= b),
        Operator::Contains => compare_strings(&actual, expected, |a, b| a.contains(b)),
        Operator::NotContains => compare_strings(&actual, expected, |a, b| !a.contains(b)),
        Operator::StartsWith => compare_strings(&actual, expected, |a, b| a.starts_with(b)),
        Operator::EndsWith => compare_strings(&actual, expected, |a, b| a.ends_with(b)),
        Operator::In => match expected {
            ConditionValue::List(items) => contains_strict(items, &actual),
            _ => false,
        },
        Operator::NotIn => match expected {
            ConditionValue::List(items) => !contains_strict(items, &actual),
            _ => false,
        },
        Operator::Unknown => false,
    }
}

/// AND over all conditions. An empty list matches.
pub fn match_all_conditions(conditions: &[Condition], context: &EvaluationContext) -> bool {
    conditions
        .iter()
        .all(|condition| match_condition(condition, context))
}

fn strict_eq(actual: &AttributeValue, expected: &ConditionValue) -> bool {
    match (actual, expected) {
        (AttributeValue::Bool(a), ConditionValue::Bool(b)) => a == b,
        (AttributeValue::Number(a), ConditionValue::Number(b)) => a == b,
        (AttributeValue::String(a), ConditionValue::String(b)) => a == b,
        _ => false,
    }
}

fn compare_numbers(
    actual: &AttributeValue,
    expected: &ConditionValue,
    cmp: impl Fn(f64, f64) -> bool,
) -> bool {
    match (actual, expected) {
        (AttributeValue::Number(a), ConditionValue::Number(b)) => cmp(*a, *b),
        _ => false,
    }
}

fn compare_strings(
    actual: &AttributeValue,
    expected: &ConditionValue,
    cmp: impl Fn(&str, &str) -> bool,
) -> bool {
    match (actual, expected) {
        (AttributeValue::String(a), ConditionValue::String(b)) => cmp(a, b),
        _ => false,
    }
}

// list members are strings, so only a string attribute can be a member
fn contains_strict(items: &[String], actual: &AttributeValue) -> bool {
    match actual {
        AttributeValue::String(s) => items.iter().any(|item| item == s),
        _ => false,
    }
}
