pub mod conditions;
pub mod context;
pub mod percentage;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::flags::{Flag, FlagEnvironmentConfig, FlagType, FlagValue};
use crate::rules::TargetingRule;

pub use conditions::{match_all_conditions, match_condition};
pub use context::{AttributeValue, EvaluationContext};
pub use percentage::{bucket, is_in_percentage};

/// Why a flag resolved to the value it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationReason {
    /// The flag, or its config for the environment, does not exist.
    FlagNotFound,
    /// The flag is switched off in the environment.
    Disabled,
    /// A rule with a 100% rollout matched.
    TargetingMatch,
    /// A rule matched and the identifier fell inside its partial rollout.
    PercentageRollout,
    /// No rule matched.
    Default,
}

// Flag evaluation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult<T = FlagValue> {
    pub flag_key: String,
    pub value: T,
    pub reason: EvaluationReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<Uuid>,
}

impl<T> EvaluationResult<T> {
    pub fn map_value<U>(self, f: impl FnOnce(T) -> U) -> EvaluationResult<U> {
        EvaluationResult {
            flag_key: self.flag_key,
            value: f(self.value),
            reason: self.reason,
            rule_id: self.rule_id,
        }
    }
}

impl EvaluationResult {
    /// Result for a flag that is unknown, or known but unconfigured in the environment.
    pub fn not_found(flag_key: impl Into<String>, flag_type: Option<FlagType>) -> Self {
        Self {
            flag_key: flag_key.into(),
            value: flag_type.unwrap_or(FlagType::Boolean).zero_value(),
            reason: EvaluationReason::FlagNotFound,
            rule_id: None,
        }
    }

    fn from_rule(flag_key: &str, rule: &TargetingRule, reason: EvaluationReason) -> Self {
        Self {
            flag_key: flag_key.to_string(),
            value: rule.value.clone(),
            reason,
            rule_id: Some(rule.id),
        }
    }

    fn from_config(flag_key: &str, config: &FlagEnvironmentConfig, reason: EvaluationReason) -> Self {
        Self {
            flag_key: flag_key.to_string(),
            value: config.value.clone(),
            reason,
            rule_id: None,
        }
    }
}

/// Evaluate a flag in one environment for a given context.
///
/// Order of decisions:
/// 1. No flag or no config: `FLAG_NOT_FOUND` with the type's zero value
///    (`false` when the flag itself is unknown)
/// 2. Config disabled: `DISABLED` with the config value, rules are not consulted
/// 3. Rules by ascending priority, first match wins
/// 4. Otherwise `DEFAULT` with the config value
///
/// When the flag is unknown the result's `flag_key` is empty; callers that
/// looked the flag up by key should use [`EvaluationResult::not_found`].
pub fn evaluate(
    flag: Option<&Flag>,
    config: Option<&FlagEnvironmentConfig>,
    context: &EvaluationContext,
) -> EvaluationResult {
    let (flag, config) = match (flag, config) {
        (Some(flag), Some(config)) => (flag, config),
        (Some(flag), None) => return EvaluationResult::not_found(&flag.key, Some(flag.flag_type)),
        (None, _) => return EvaluationResult::not_found("", None),
    };

    if !config.enabled {
        return EvaluationResult::from_config(&flag.key, config, EvaluationReason::Disabled);
    }

    // sort_by_key is stable, so equal priorities keep their stored order
    let mut rules: Vec<&TargetingRule> = config.targeting_rules.iter().collect();
    rules.sort_by_key(|rule| rule.priority);

    for rule in rules {
        if let Some(reason) = rule_outcome(&flag.key, rule, context) {
            return EvaluationResult::from_rule(&flag.key, rule, reason);
        }
    }

    EvaluationResult::from_config(&flag.key, config, EvaluationReason::Default)
}

/// `Some(reason)` when the rule serves its value to this context.
fn rule_outcome(flag_key: &str, rule: &TargetingRule, context: &EvaluationContext) -> Option<EvaluationReason> {
    if !match_all_conditions(&rule.conditions, context) {
        return None;
    }

    if rule.percentage >= 100.0 {
        return Some(EvaluationReason::TargetingMatch);
    }

    // Partial rollouts need an identity to bucket; missing or empty ids fall through
    let user_id = context.user_id.as_deref().filter(|id| !id.is_empty())?;
    if is_in_percentage(flag_key, user_id, rule.percentage) {
        Some(EvaluationReason::PercentageRollout)
    } else {
        None
    }
}

pub fn evaluate_boolean(
    flag: Option<&Flag>,
    config: Option<&FlagEnvironmentConfig>,
    context: &EvaluationContext,
) -> EvaluationResult<bool> {
    evaluate(flag, config, context).map_value(|value| value.to_bool())
}

pub fn evaluate_string(
    flag: Option<&Flag>,
    config: Option<&FlagEnvironmentConfig>,
    context: &EvaluationContext,
) -> EvaluationResult<String> {
    evaluate(flag, config, context).map_value(|value| value.to_text())
}

pub fn evaluate_number(
    flag: Option<&Flag>,
    config: Option<&FlagEnvironmentConfig>,
    context: &EvaluationContext,
) -> EvaluationResult<f64> {
    evaluate(flag, config, context).map_value(|value| value.to_number())
}

pub fn evaluate_json(
    flag: Option<&Flag>,
    config: Option<&FlagEnvironmentConfig>,
    context: &EvaluationContext,
) -> EvaluationResult<Map<String, Value>> {
    evaluate(flag, config, context).map_value(|value| value.to_object())
}
