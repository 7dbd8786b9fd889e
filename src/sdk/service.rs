use tracing::debug;

use crate::environments::Environment;
use crate::evaluation::{evaluate, EvaluationContext, EvaluationResult};
use crate::flags::{Flag, FlagEnvironmentConfig};
use crate::projects::Project;

use super::{FlagSource, SdkError};

/// Resolves SDK evaluation requests against a [`FlagSource`].
pub struct SdkEvaluationService<S> {
    source: S,
}

impl<S: FlagSource> SdkEvaluationService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Evaluate a single flag by key.
    ///
    /// An unknown flag, or one without a config in this environment, resolves
    /// to `FLAG_NOT_FOUND` rather than an error.
    pub fn evaluate_flag(
        &self,
        project_key: &str,
        environment_key: &str,
        flag_key: &str,
        context: &EvaluationContext,
    ) -> Result<EvaluationResult, SdkError> {
        let (project, environment) = self.resolve(project_key, environment_key)?;

        let flag = self.source.find_flag(project.id, flag_key);
        let config = flag.and_then(|f| self.source.find_config(f.id, environment.id));

        let result = match flag {
            Some(_) => evaluate(flag, config, context),
            None => EvaluationResult::not_found(flag_key, None),
        };

        debug!(
            project = project_key,
            environment = environment_key,
            flag = flag_key,
            reason = ?result.reason,
            "evaluated flag"
        );

        Ok(result)
    }

    /// Evaluate every flag that has a config in the environment, in source order.
    pub fn evaluate_all_flags(
        &self,
        project_key: &str,
        environment_key: &str,
        context: &EvaluationContext,
    ) -> Result<Vec<EvaluationResult>, SdkError> {
        let flags = self.flags_for_environment(project_key, environment_key)?;

        let results: Vec<EvaluationResult> = flags
            .into_iter()
            .map(|(flag, config)| evaluate(Some(flag), Some(config), context))
            .collect();

        debug!(
            project = project_key,
            environment = environment_key,
            count = results.len(),
            "evaluated all flags"
        );

        Ok(results)
    }

    /// Flags of the project paired with their config in the environment.
    /// Flags with no config there are left out.
    pub fn flags_for_environment(
        &self,
        project_key: &str,
        environment_key: &str,
    ) -> Result<Vec<(&Flag, &FlagEnvironmentConfig)>, SdkError> {
        let (project, environment) = self.resolve(project_key, environment_key)?;

        Ok(self
            .source
            .project_flags(project.id)
            .into_iter()
            .filter_map(|flag| {
                self.source
                    .find_config(flag.id, environment.id)
                    .map(|config| (flag, config))
            })
            .collect())
    }

    fn resolve(&self, project_key: &str, environment_key: &str) -> Result<(&Project, &Environment), SdkError> {
        let project = self
            .source
            .find_project(project_key)
            .ok_or_else(|| SdkError::ProjectNotFound(project_key.to_string()))?;

        let environment = self
            .source
            .find_environment(project.id, environment_key)
            .ok_or_else(|| SdkError::EnvironmentNotFound(environment_key.to_string()))?;

        Ok((project, environment))
    }
}
