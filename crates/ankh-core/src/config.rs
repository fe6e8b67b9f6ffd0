//! Global configuration
//!
//! Lives at `~/.ankh/config` and names the contexts ankh can deploy to. A
//! config must be validated before use; validation binds the selected
//! context into a [`ValidatedConfig`] that the rest of the pipeline reads.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::error::{CoreError, Result};
use crate::value::Value;

/// Shape of the global config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Name of the context to use for this run
    #[serde(default)]
    pub current_context: String,

    #[serde(default)]
    pub supported_environments: Option<Vec<String>>,

    #[serde(default)]
    pub supported_resource_profiles: Option<Vec<String>>,

    #[serde(default)]
    pub contexts: IndexMap<String, Context>,
}

/// A target cluster/environment/profile binding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Context {
    /// Key this context is stored under in `contexts`
    ///
    /// A `name` written in the file is accepted but the key always wins.
    #[serde(default, skip_serializing)]
    pub name: String,

    #[serde(default)]
    pub kube_context: String,

    #[serde(default)]
    pub environment: String,

    #[serde(default)]
    pub resource_profile: String,

    /// Base address charts are fetched from when no local copy exists
    #[serde(default)]
    pub helm_registry_url: String,

    /// Admin contexts also deploy `admin_dependencies`
    #[serde(default)]
    pub cluster_admin: bool,

    /// Injected into every chart as `global.*` settings
    #[serde(default)]
    pub global: Value,
}

/// A single broken rule in the global config
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigViolation {
    #[error("missing or empty `current_context`")]
    MissingCurrentContext,

    #[error("missing or empty `supported_environments`")]
    MissingSupportedEnvironments,

    #[error("missing or empty `supported_resource_profiles`")]
    MissingSupportedResourceProfiles,

    #[error("context '{0}' not found in `contexts`")]
    UnknownContext(String),

    #[error("environment '{0}' not found in `supported_environments`")]
    UnsupportedEnvironment(String),

    #[error("resource profile '{0}' not found in `supported_resource_profiles`")]
    UnsupportedResourceProfile(String),

    #[error("missing or empty `{0}`")]
    EmptyField(&'static str),
}

impl GlobalConfig {
    /// Load and strictly parse the config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content).map_err(|source| CoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse config content, naming each context after its key
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let mut config: GlobalConfig = serde_yaml::from_str(content)?;
        for (name, context) in config.contexts.iter_mut() {
            context.name = name.clone();
        }
        Ok(config)
    }

    /// Every rule this config breaks
    ///
    /// Does not stop at the first problem so a user can fix them all in one go.
    pub fn violations(&self) -> Vec<ConfigViolation> {
        let mut violations = Vec::new();

        if self.current_context.is_empty() {
            violations.push(ConfigViolation::MissingCurrentContext);
        }

        let environments = non_empty(&self.supported_environments);
        if environments.is_none() {
            violations.push(ConfigViolation::MissingSupportedEnvironments);
        }

        let profiles = non_empty(&self.supported_resource_profiles);
        if profiles.is_none() {
            violations.push(ConfigViolation::MissingSupportedResourceProfiles);
        }

        let Some(selected) = self.contexts.get(&self.current_context) else {
            violations.push(ConfigViolation::UnknownContext(
                self.current_context.clone(),
            ));
            return violations;
        };

        if !contains(environments, &selected.environment) {
            violations.push(ConfigViolation::UnsupportedEnvironment(
                selected.environment.clone(),
            ));
        }

        if !contains(profiles, &selected.resource_profile) {
            violations.push(ConfigViolation::UnsupportedResourceProfile(
                selected.resource_profile.clone(),
            ));
        }

        let required = [
            ("helm_registry_url", &selected.helm_registry_url),
            ("kube_context", &selected.kube_context),
            ("environment", &selected.environment),
            ("resource_profile", &selected.resource_profile),
        ];
        for (field, value) in required {
            if value.is_empty() {
                violations.push(ConfigViolation::EmptyField(field));
            }
        }

        violations
    }

    /// Validate and bind the current context
    pub fn validate(self) -> Result<ValidatedConfig> {
        let violations = self.violations();
        if !violations.is_empty() {
            return Err(CoreError::InvalidConfig { violations });
        }

        let current = self
            .contexts
            .get(&self.current_context)
            .cloned()
            .ok_or_else(|| CoreError::InvalidConfig {
                violations: vec![ConfigViolation::UnknownContext(
                    self.current_context.clone(),
                )],
            })?;

        Ok(ValidatedConfig {
            config: self,
            current,
        })
    }
}

fn non_empty(list: &Option<Vec<String>>) -> Option<&[String]> {
    list.as_deref().filter(|items| !items.is_empty())
}

fn contains(list: Option<&[String]>, item: &str) -> bool {
    list.is_some_and(|items| items.iter().any(|i| i == item))
}

/// A global config that passed validation, with its current context bound
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    config: GlobalConfig,
    current: Context,
}

impl ValidatedConfig {
    /// The context selected by `current_context`
    pub fn current_context(&self) -> &Context {
        &self.current
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    pub fn supports_environment(&self, environment: &str) -> bool {
        contains(non_empty(&self.config.supported_environments), environment)
    }

    pub fn supports_resource_profile(&self, profile: &str) -> bool {
        contains(non_empty(&self.config.supported_resource_profiles), profile)
    }
}
