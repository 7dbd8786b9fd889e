use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::environments::Environment;
use crate::flags::{Flag, FlagEnvironmentConfig};
use crate::projects::Project;
use crate::rules::validate_percentage;

use super::FlagSource;

/// Records exported by the data layer, as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default)]
    pub flags: Vec<Flag>,
    #[serde(default)]
    pub configs: Vec<FlagEnvironmentConfig>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable, indexed view over a [`Snapshot`].
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshot: Snapshot,
    projects_by_key: HashMap<String, usize>,
    environments_by_key: HashMap<(Uuid, String), usize>,
    flags_by_project: HashMap<Uuid, Vec<usize>>,
    flags_by_key: HashMap<(Uuid, String), usize>,
    configs_by_pair: HashMap<(Uuid, Uuid), usize>,
}

impl SnapshotStore {
    pub fn new(snapshot: Snapshot) -> Self {
        let mut store = SnapshotStore::default();

        for (i, project) in snapshot.projects.iter().enumerate() {
            store.projects_by_key.insert(project.key.clone(), i);
        }

        for (i, env) in snapshot.environments.iter().enumerate() {
            store.environments_by_key.insert((env.project_id, env.key.clone()), i);
        }

        for (i, flag) in snapshot.flags.iter().enumerate() {
            store.flags_by_project.entry(flag.project_id).or_default().push(i);
            store.flags_by_key.insert((flag.project_id, flag.key.clone()), i);
        }

        for (i, config) in snapshot.configs.iter().enumerate() {
            let pair = (config.flag_id, config.environment_id);
            if store.configs_by_pair.insert(pair, i).is_some() {
                warn!(flag_id = %config.flag_id, environment_id = %config.environment_id, "duplicate flag config, keeping the last one");
            }

            for rule in &config.targeting_rules {
                if let Err(e) = validate_percentage(rule.percentage) {
                    warn!(rule_id = %rule.id, "{}", e);
                }
            }
        }

        store.snapshot = snapshot;
        store
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self::new(snapshot))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl FlagSource for SnapshotStore {
    fn find_project(&self, key: &str) -> Option<&Project> {
        self.projects_by_key.get(key).map(|&i| &self.snapshot.projects[i])
    }

    fn find_environment(&self, project_id: Uuid, key: &str) -> Option<&Environment> {
        self.environments_by_key
            .get(&(project_id, key.to_string()))
            .map(|&i| &self.snapshot.environments[i])
    }

    fn project_flags(&self, project_id: Uuid) -> Vec<&Flag> {
        self.flags_by_project
            .get(&project_id)
            .map(|indexes| indexes.iter().map(|&i| &self.snapshot.flags[i]).collect())
            .unwrap_or_default()
    }

    fn find_flag(&self, project_id: Uuid, key: &str) -> Option<&Flag> {
        self.flags_by_key
            .get(&(project_id, key.to_string()))
            .map(|&i| &self.snapshot.flags[i])
    }

    fn find_config(&self, flag_id: Uuid, environment_id: Uuid) -> Option<&FlagEnvironmentConfig> {
        self.configs_by_pair
            .get(&(flag_id, environment_id))
            .map(|&i| &self.snapshot.configs[i])
    }
}
