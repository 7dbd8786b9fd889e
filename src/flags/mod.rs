use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::keys::key_type;
use crate::rules::TargetingRule;

// MODELS

/// Runtime shape of every value attached to a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    Boolean,
    String,
    Number,
    Json,
}

impl FlagType {
    /// The value served for this type when the flag has no config in an environment.
    pub fn zero_value(self) -> FlagValue {
        match self {
            FlagType::Boolean => FlagValue::Boolean(false),
            FlagType::String => FlagValue::String(String::new()),
            FlagType::Number => FlagValue::Number(0.0),
            FlagType::Json => FlagValue::Json(Value::Object(Map::new())),
        }
    }
}

/// A flag value in its erased form. Which variant is legal is decided by the
/// flag's [`FlagType`] when the record is written, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Boolean(bool),
    Number(f64),
    String(String),
    Json(Value),
}

impl FlagValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Truthiness: `false`, empty strings, zero, NaN and JSON `null` are false.
    /// JSON scalars follow the same rules as their plain counterparts; JSON
    /// arrays and objects are always true.
    pub fn to_bool(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Json(Value::Null) => false,
            Self::Json(Value::Bool(b)) => *b,
            Self::Json(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Self::Json(Value::String(s)) => !s.is_empty(),
            Self::Json(_) => true,
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::Json(Value::String(s)) => s.clone(),
            Self::Json(v) => v.to_string(),
        }
    }

    /// Numeric conversion: `true` is 1, blank strings are 0, anything unparsable is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Number(n) => *n,
            Self::String(s) => parse_number(s),
            Self::Json(Value::Null) => 0.0,
            Self::Json(Value::Bool(b)) => Self::Boolean(*b).to_number(),
            Self::Json(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            Self::Json(Value::String(s)) => parse_number(s),
            Self::Json(_) => f64::NAN,
        }
    }

    /// Objects pass through; every other shape becomes an empty object.
    pub fn to_object(&self) -> Map<String, Value> {
        match self {
            Self::Json(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        // f64 Display already drops a trailing ".0"
        n.to_string()
    }
}

fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(n) = parse_prefixed_integer(trimmed) {
        return n;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // reject the spellings Rust accepts but a numeric conversion should not
        t if !t.chars().any(|c| c.is_ascii_digit()) => f64::NAN,
        t => t.parse().unwrap_or(f64::NAN),
    }
}

/// Unsigned `0x`, `0o` and `0b` literals. `None` when there is no such prefix.
fn parse_prefixed_integer(s: &str) -> Option<f64> {
    let radix = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };

    let digits = &s[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }

    let value = digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN);
    Some(value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub id: Uuid,
    pub project_id: Uuid,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub default_value: FlagValue,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Flag {
    pub fn new(project_id: Uuid, key: FlagKey, name: impl Into<String>, flag_type: FlagType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            key: key.into(),
            name: name.into(),
            description: None,
            flag_type,
            default_value: flag_type.zero_value(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_default_value(mut self, value: FlagValue) -> Self {
        self.default_value = value;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Per-environment state of a flag. Unique on `(flag_id, environment_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagEnvironmentConfig {
    pub id: Uuid,
    pub flag_id: Uuid,
    pub environment_id: Uuid,
    pub enabled: bool,
    /// Served while the flag is disabled and when no targeting rule matches.
    pub value: FlagValue,
    #[serde(default)]
    pub targeting_rules: Vec<TargetingRule>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl FlagEnvironmentConfig {
    pub fn new(flag_id: Uuid, environment_id: Uuid, enabled: bool, value: FlagValue) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            flag_id,
            environment_id,
            enabled,
            value,
            targeting_rules: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_rule(mut self, rule: TargetingRule) -> Self {
        self.targeting_rules.push(rule);
        self
    }
}

// HELPER FUNCTIONS

key_type!(
    /// A flag key: unique within its project, 2-64 chars of `[a-z0-9-]`, starting with a letter.
    FlagKey,
    "Flag"
);
