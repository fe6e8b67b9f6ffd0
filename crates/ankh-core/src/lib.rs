//! ankh core - descriptors, global configuration and value overlays
//!
//! This crate provides the types shared by the rest of ankh:
//! - `Value`: parsed YAML data as an explicit tagged tree
//! - `flatten`: dotted `key=value` settings from nested values
//! - `GlobalConfig`: the `~/.ankh/config` file and its validation
//! - `UnitDescriptor`: an `ankh.yaml` file with its dependency tree loaded
//! - `RunConfig`: per-run settings and the scratch workspace

pub mod config;
pub mod descriptor;
pub mod error;
pub mod flatten;
pub mod value;
pub mod workspace;

pub use config::{ConfigViolation, Context, GlobalConfig, ValidatedConfig};
pub use descriptor::{ChartDescriptor, DESCRIPTOR_FILE, Dependency, UnitDescriptor};
pub use error::{CoreError, Result};
pub use flatten::{flatten, flatten_under};
pub use value::{Mapping, Number, Value, parse_set_values};
pub use workspace::{RunConfig, Workspace};
