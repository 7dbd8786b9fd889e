use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::keys::key_type;

// MODELS

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: Uuid,
    pub project_id: Uuid,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Environment {
    pub fn new(project_id: Uuid, key: EnvironmentKey, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            key: key.into(),
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// HELPER FUNCTIONS

key_type!(
    /// Environment key, e.g. `production` or `staging-eu`.
    EnvironmentKey,
    "Environment"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_environment_key() {
        assert!(EnvironmentKey::parse("production").is_ok());
        assert!(EnvironmentKey::parse("staging").is_ok());
        assert!(EnvironmentKey::parse("dev-test").is_ok());
        assert!(EnvironmentKey::parse("env123").is_ok());

        assert!(EnvironmentKey::parse("").is_err());
        assert!(EnvironmentKey::parse("Production").is_err()); // uppercase
        assert!(EnvironmentKey::parse("-invalid").is_err()); // starts with hyphen
        assert!(EnvironmentKey::parse("env_123").is_err()); // underscore
        assert!(EnvironmentKey::parse("has space").is_err());
        assert!(EnvironmentKey::parse("has.dot").is_err());
    }

    #[test]
    fn test_error_mentions_environment() {
        let err = EnvironmentKey::parse("x").unwrap_err();
        assert_eq!(err.to_string(), "Environment key must be at least 2 characters long");
    }

    #[test]
    fn test_new_environment_uses_key() {
        let project_id = Uuid::new_v4();
        let env = Environment::new(project_id, EnvironmentKey::parse("production").unwrap(), "Production");

        assert_eq!(env.key, "production");
        assert_eq!(env.project_id, project_id);
    }
}
