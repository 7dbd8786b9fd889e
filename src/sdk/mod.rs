pub mod service;
pub mod snapshot;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::environments::Environment;
use crate::evaluation::EvaluationResult;
use crate::flags::{Flag, FlagEnvironmentConfig};
use crate::projects::Project;

pub use crate::evaluation::EvaluationContext;
pub use service::SdkEvaluationService;
pub use snapshot::{Snapshot, SnapshotError, SnapshotStore};

/// Read-only access to the records the data layer owns.
pub trait FlagSource {
    fn find_project(&self, key: &str) -> Option<&Project>;

    fn find_environment(&self, project_id: Uuid, key: &str) -> Option<&Environment>;

    /// Flags of a project in a stable order.
    fn project_flags(&self, project_id: Uuid) -> Vec<&Flag>;

    fn find_flag(&self, project_id: Uuid, key: &str) -> Option<&Flag>;

    fn find_config(&self, flag_id: Uuid, environment_id: Uuid) -> Option<&FlagEnvironmentConfig>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Environment '{0}' not found")]
    EnvironmentNotFound(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    pub project: String,
    pub environment: String,
    /// Evaluate only this flag; every configured flag when absent.
    #[serde(default)]
    pub flag_key: Option<String>,
    #[serde(default)]
    pub context: EvaluationContext,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub flags: Vec<EvaluationResult>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_evaluate_request_defaults() {
        let request: EvaluateRequest = serde_json::from_value(json!({
            "project": "storefront",
            "environment": "production"
        }))
        .unwrap();

        assert!(request.flag_key.is_none());
        assert_eq!(request.context, EvaluationContext::default());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SdkError::EnvironmentNotFound("qa".to_string()).to_string(),
            "Environment 'qa' not found"
        );
        assert_eq!(
            SdkError::ProjectNotFound("shop".to_string()).to_string(),
            "Project 'shop' not found"
        );
    }
}
