//! Per-run settings and the scratch directory charts are rendered from
//!
//! Everything a run derives from the environment (home directory, start
//! time) is computed once into a [`RunConfig`] and passed down explicitly.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::config::{GlobalConfig, ValidatedConfig};
use crate::error::{CoreError, Result};

/// Directory under `$HOME` holding the global config and run data
pub const CONFIG_DIR_NAME: &str = ".ankh";

/// Global config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config";

/// Scratch directory unique to one run
///
/// Holds one subdirectory per chart with its fetched archive and generated
/// overlay files. Nothing is cleaned up while the process is alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<config dir>/data/<unix seconds>`
    pub fn for_run(config_dir: &Path, started: DateTime<Utc>) -> Self {
        Self::new(
            config_dir
                .join("data")
                .join(started.timestamp().to_string()),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the workspace root
    pub fn create(&self) -> Result<()> {
        create_dir(&self.root)
    }

    /// Directory for one chart's files, created on first use
    pub fn chart_dir(&self, chart: &str) -> Result<PathBuf> {
        let dir = self.root.join(chart);
        create_dir(&dir)?;
        Ok(dir)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| CoreError::Workspace {
        path: path.to_path_buf(),
        source,
    })
}

/// Settings fixed for the lifetime of one invocation
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Global config file to read
    pub config_path: PathBuf,

    pub workspace: Workspace,
}

impl RunConfig {
    /// Settings rooted at an explicit config directory
    pub fn new(config_dir: &Path, started: DateTime<Utc>) -> Self {
        Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            workspace: Workspace::for_run(config_dir, started),
        }
    }

    /// Settings for this process, stamped with the current time
    ///
    /// An explicit `config_path` overrides `~/.ankh/config`.
    pub fn from_env(config_path: Option<PathBuf>) -> Result<Self> {
        Self::locate(dirs::home_dir().as_deref(), config_path, Utc::now())
    }

    /// Work out the config file and workspace locations
    ///
    /// The workspace lives under `~/.ankh`, or next to an explicit config file
    /// when there is no home directory.
    pub fn locate(
        home: Option<&Path>,
        config_path: Option<PathBuf>,
        started: DateTime<Utc>,
    ) -> Result<Self> {
        match (home, config_path) {
            (Some(home), config_path) => {
                let mut run = Self::new(&home.join(CONFIG_DIR_NAME), started);
                if let Some(path) = config_path {
                    run.config_path = path;
                }
                Ok(run)
            }
            (None, Some(path)) => {
                let config_dir = path
                    .parent()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."))
                    .to_path_buf();
                Ok(Self {
                    config_path: path,
                    workspace: Workspace::for_run(&config_dir, started),
                })
            }
            (None, None) => Err(CoreError::NoHomeDirectory),
        }
    }

    /// Create the workspace and load the validated global config
    pub fn prepare(&self) -> Result<ValidatedConfig> {
        self.workspace.create()?;
        let config = GlobalConfig::load(&self.config_path)?.validate()?;

        tracing::debug!(
            config = %self.config_path.display(),
            workspace = %self.workspace.root().display(),
            context = %config.current_context().name,
            "prepared run"
        );

        Ok(config)
    }
}
