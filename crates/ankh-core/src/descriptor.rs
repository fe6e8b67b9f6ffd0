//! Unit descriptors (`ankh.yaml`) and recursive dependency loading
//!
//! A unit names a namespace, the charts to deploy into it and the other
//! units it depends on. Loading a unit loads its whole dependency tree.
//! Every reference is loaded on its own, so a unit reached through two
//! branches appears twice in the tree. Only a unit that depends on one of
//! its own ancestors is rejected.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::ValidatedConfig;
use crate::error::{CoreError, Result};
use crate::value::Value;

/// File name looked up inside a dependency directory
pub const DESCRIPTOR_FILE: &str = "ankh.yaml";

/// Directory next to a descriptor holding local chart sources
pub const LOCAL_CHARTS_DIR: &str = "charts";

/// On-disk shape of a descriptor
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DescriptorFile {
    #[serde(default)]
    namespace: String,

    #[serde(default)]
    admin_dependencies: Option<Vec<String>>,

    #[serde(default)]
    dependencies: Option<Vec<String>>,

    #[serde(default)]
    charts: Option<Vec<ChartDescriptor>>,
}

/// A chart deployed by a unit, with its value overlays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartDescriptor {
    pub name: String,

    #[serde(default)]
    pub version: String,

    /// Values applied regardless of environment
    #[serde(default)]
    pub default_values: Option<Value>,

    /// Keys line up with `supported_environments`
    #[serde(default)]
    pub values: Option<IndexMap<String, Value>>,

    /// Keys line up with `supported_resource_profiles`
    #[serde(default)]
    pub resource_profiles: Option<IndexMap<String, Value>>,
}

impl ChartDescriptor {
    /// Overlay for one environment, if declared
    pub fn values_for(&self, environment: &str) -> Option<&Value> {
        self.values.as_ref()?.get(environment)
    }

    /// Overlay for one resource profile, if declared
    pub fn resource_profile(&self, profile: &str) -> Option<&Value> {
        self.resource_profiles.as_ref()?.get(profile)
    }

    /// Check overlay keys against the supported environments and profiles
    ///
    /// Stops at the first unsupported key.
    pub fn validate(&self, config: &ValidatedConfig) -> Result<()> {
        for environment in self.values.iter().flat_map(|m| m.keys()) {
            if !config.supports_environment(environment) {
                return Err(CoreError::UnsupportedEnvironment {
                    chart: self.name.clone(),
                    environment: environment.clone(),
                });
            }
        }

        for profile in self.resource_profiles.iter().flat_map(|m| m.keys()) {
            if !config.supports_resource_profile(profile) {
                return Err(CoreError::UnsupportedResourceProfile {
                    chart: self.name.clone(),
                    profile: profile.clone(),
                });
            }
        }

        Ok(())
    }
}

/// A fully loaded unit with its dependency tree
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDescriptor {
    /// Absolute path of the descriptor file
    pub path: PathBuf,

    /// Kubernetes namespace the charts are rendered into
    pub namespace: String,

    /// Only deployed when the current context is a cluster admin
    pub admin_dependencies: Vec<Dependency>,

    pub dependencies: Vec<Dependency>,

    pub charts: Vec<ChartDescriptor>,
}

/// A declared dependency and the unit it resolved to
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    /// Reference as written in the declaring descriptor
    pub reference: String,

    pub unit: UnitDescriptor,
}

impl UnitDescriptor {
    /// Load a descriptor and, recursively, everything it depends on
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut chain = Vec::new();
        load_unit(path.as_ref(), &mut chain)
    }

    /// Directory containing the descriptor
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }

    /// Where a local copy of a chart would live
    pub fn local_chart_dir(&self, chart: &str) -> PathBuf {
        self.dir().join(LOCAL_CHARTS_DIR).join(chart)
    }

    /// Number of units in this tree, this one included
    pub fn unit_count(&self) -> usize {
        1 + self
            .admin_dependencies
            .iter()
            .chain(&self.dependencies)
            .map(|dep| dep.unit.unit_count())
            .sum::<usize>()
    }
}

/// Turn a dependency reference into a descriptor path
///
/// Relative references name a directory next to the declaring descriptor.
/// Absolute references may name the descriptor itself or its directory.
pub fn resolve_reference(declaring_dir: &Path, reference: &str) -> PathBuf {
    let target = Path::new(reference);
    if target.is_absolute() {
        if target.is_dir() {
            target.join(DESCRIPTOR_FILE)
        } else {
            target.to_path_buf()
        }
    } else {
        declaring_dir.join(target).join(DESCRIPTOR_FILE)
    }
}

fn load_unit(path: &Path, chain: &mut Vec<PathBuf>) -> Result<UnitDescriptor> {
    let read_error = |source| CoreError::Read {
        path: path.to_path_buf(),
        source,
    };

    let absolute = std::path::absolute(path).map_err(read_error)?;
    let key = std::fs::canonicalize(&absolute).unwrap_or_else(|_| absolute.clone());

    if chain.contains(&key) {
        let cycle = chain
            .iter()
            .skip_while(|p| **p != key)
            .chain(std::iter::once(&key))
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(CoreError::Cycle { chain: cycle });
    }

    let content = std::fs::read_to_string(&absolute).map_err(read_error)?;
    let file: DescriptorFile =
        serde_yaml::from_str(&content).map_err(|source| CoreError::Parse {
            path: absolute.clone(),
            source,
        })?;

    tracing::debug!(path = %absolute.display(), namespace = %file.namespace, "loaded descriptor");

    let dir = absolute.parent().map(Path::to_path_buf).unwrap_or_default();

    chain.push(key);
    let admin_dependencies = resolve_all(
        file.admin_dependencies.unwrap_or_default(),
        &absolute,
        &dir,
        chain,
    )?;
    let dependencies = resolve_all(
        file.dependencies.unwrap_or_default(),
        &absolute,
        &dir,
        chain,
    )?;
    chain.pop();

    Ok(UnitDescriptor {
        path: absolute,
        namespace: file.namespace,
        admin_dependencies,
        dependencies,
        charts: file.charts.unwrap_or_default(),
    })
}

fn resolve_all(
    references: Vec<String>,
    declared_in: &Path,
    dir: &Path,
    chain: &mut Vec<PathBuf>,
) -> Result<Vec<Dependency>> {
    references
        .into_iter()
        .map(|reference| {
            let target = resolve_reference(dir, &reference);
            match load_unit(&target, chain) {
                Ok(unit) => Ok(Dependency { reference, unit }),
                Err(err @ CoreError::Cycle { .. }) => Err(err),
                Err(err) => Err(CoreError::Resolution {
                    reference,
                    declared_in: declared_in.to_path_buf(),
                    source: Box::new(err),
                }),
            }
        })
        .collect()
}
