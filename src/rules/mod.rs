use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flags::FlagValue;

// MODELS

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetingRule {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    /// All conditions must match (AND). An empty list matches every context.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Share of matching identifiers that receive `value`, 0-100. Fractions allowed.
    pub percentage: f64,
    pub value: FlagValue,
    /// Lower runs first. Equal priorities keep their list order.
    #[serde(default)]
    pub priority: i32,
}

impl TargetingRule {
    pub fn new(name: impl Into<String>, value: FlagValue) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            conditions: Vec::new(),
            percentage: 100.0,
            value,
            priority: 0,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_percentage(mut self, percentage: f64) -> Self {
        self.percentage = percentage;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// A single `attribute operator value` comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub attribute: String,
    pub operator: Operator,
    pub value: ConditionValue,
}

impl Condition {
    pub fn new(attribute: impl Into<String>, operator: Operator, value: impl Into<ConditionValue>) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    /// Any operator name this build does not know. Never matches.
    #[serde(other)]
    Unknown,
}

impl Operator {
    /// Operators that hold when the attribute is missing from the context.
    pub fn matches_absent(self) -> bool {
        matches!(self, Operator::Neq | Operator::NotIn | Operator::NotContains)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<String>),
}

impl From<bool> for ConditionValue {
    fn from(value: bool) -> Self {
        ConditionValue::Bool(value)
    }
}

impl From<f64> for ConditionValue {
    fn from(value: f64) -> Self {
        ConditionValue::Number(value)
    }
}

impl From<i32> for ConditionValue {
    fn from(value: i32) -> Self {
        ConditionValue::Number(value.into())
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        ConditionValue::String(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        ConditionValue::String(value)
    }
}

impl From<Vec<&str>> for ConditionValue {
    fn from(values: Vec<&str>) -> Self {
        ConditionValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for ConditionValue {
    fn from(values: Vec<String>) -> Self {
        ConditionValue::List(values)
    }
}

// HELPER FUNCTIONS

/// Checks that a rollout percentage lies in 0..=100. NaN is rejected.
pub fn validate_percentage(percentage: f64) -> Result<(), String> {
    if !(0.0..=100.0).contains(&percentage) {
        return Err(format!(
            "Rollout percentage must be between 0 and 100, got {}",
            percentage
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(0.0).is_ok());
        assert!(validate_percentage(50.0).is_ok());
        assert!(validate_percentage(12.5).is_ok());
        assert!(validate_percentage(100.0).is_ok());
        assert!(validate_percentage(-1.0).is_err());
        assert!(validate_percentage(100.5).is_err());
        assert!(validate_percentage(f64::NAN).is_err());
    }

    #[test]
    fn test_operator_names() {
        let ops: Vec<Operator> = serde_json::from_value(json!([
            "eq", "neq", "gt", "gte", "lt", "lte", "contains", "not_contains",
            "starts_with", "ends_with", "in", "not_in"
        ]))
        .unwrap();

        assert_eq!(ops.len(), 12);
        assert_eq!(ops[7], Operator::NotContains);
        assert_eq!(ops[11], Operator::NotIn);
        assert!(!ops.contains(&Operator::Unknown));
    }

    #[test]
    fn test_unknown_operator_deserializes() {
        let op: Operator = serde_json::from_value(json!("matches_regex")).unwrap();
        assert_eq!(op, Operator::Unknown);
    }

    #[test]
    fn test_matches_absent() {
        assert!(Operator::Neq.matches_absent());
        assert!(Operator::NotIn.matches_absent());
        assert!(Operator::NotContains.matches_absent());
        assert!(!Operator::Eq.matches_absent());
        assert!(!Operator::In.matches_absent());
        assert!(!Operator::Unknown.matches_absent());
    }

    #[test]
    fn test_rule_deserializes_with_defaults() {
        let rule: TargetingRule = serde_json::from_value(json!({
            "id": "3e1f6a0c-8d7b-4c2e-a1f9-0b2c3d4e5f60",
            "conditions": [
                { "attribute": "plan", "operator": "in", "value": ["pro", "enterprise"] },
                { "attribute": "age", "operator": "gte", "value": 18 }
            ],
            "percentage": 25,
            "value": true
        }))
        .unwrap();

        assert_eq!(rule.priority, 0);
        assert_eq!(rule.name, "");
        assert_eq!(rule.conditions[0].value, ConditionValue::from(vec!["pro", "enterprise"]));
        assert_eq!(rule.conditions[1].value, ConditionValue::Number(18.0));
        assert_eq!(rule.value, FlagValue::Boolean(true));
        assert_eq!(rule.percentage, 25.0);
    }

    #[test]
    fn test_rule_accepts_fractional_percentage() {
        let rule: TargetingRule = serde_json::from_value(json!({
            "id": "3e1f6a0c-8d7b-4c2e-a1f9-0b2c3d4e5f60",
            "percentage": 12.5,
            "value": "canary"
        }))
        .unwrap();

        assert_eq!(rule.percentage, 12.5);
        assert!(rule.conditions.is_empty());
    }
}
