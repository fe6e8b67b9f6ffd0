//! Core error types

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigViolation;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unable to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to process {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unable to resolve dependency '{reference}' declared in {}", declared_in.display())]
    Resolution {
        reference: String,
        declared_in: PathBuf,
        #[source]
        source: Box<CoreError>,
    },

    #[error("dependency cycle detected: {chain}")]
    Cycle { chain: String },

    #[error("config validation error(s):\n{}", format_violations(.violations))]
    InvalidConfig { violations: Vec<ConfigViolation> },

    #[error("unsupported environment '{environment}' found in `values` for chart '{chart}'")]
    UnsupportedEnvironment { chart: String, environment: String },

    #[error(
        "unsupported resource profile '{profile}' found in `resource_profiles` for chart '{chart}'"
    )]
    UnsupportedResourceProfile { chart: String, profile: String },

    #[error("invalid --set format: '{setting}'. Expected key=value")]
    InvalidSetting { setting: String },

    #[error("could not determine home directory")]
    NoHomeDirectory,

    #[error("unable to create workspace directory {}", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CoreError {
    /// True when a descriptor tree or the config file could not be loaded
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            CoreError::Read { .. }
                | CoreError::Parse { .. }
                | CoreError::Resolution { .. }
                | CoreError::Cycle { .. }
        )
    }

    /// True for global config and chart level validation failures
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidConfig { .. }
                | CoreError::UnsupportedEnvironment { .. }
                | CoreError::UnsupportedResourceProfile { .. }
        )
    }
}

fn format_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, CoreError>;
