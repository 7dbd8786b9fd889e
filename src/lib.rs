//! Feature flag evaluation.
//!
//! The heart of the crate is [`evaluation::evaluate`], a pure function that
//! decides which value a flag serves for a context: not found, disabled,
//! first matching targeting rule by priority (optionally gated by a stable
//! percentage rollout), or the environment default. Around it sit the flag
//! records, key value objects, and an SDK-facing service that looks flags up
//! through a read-only [`sdk::FlagSource`].

pub mod config;
pub mod environments;
pub mod evaluation;
pub mod flags;
pub mod keys;
pub mod projects;
pub mod rules;
pub mod sdk;

pub use evaluation::{
    evaluate, evaluate_boolean, evaluate_json, evaluate_number, evaluate_string, EvaluationContext,
    EvaluationReason, EvaluationResult,
};
pub use flags::{Flag, FlagEnvironmentConfig, FlagKey, FlagType, FlagValue};
pub use rules::{Condition, ConditionValue, Operator, TargetingRule};
