//! Per-chart value overlays
//!
//! A chart's values are assembled from up to three overlay files plus the
//! context's global data, in increasing precedence:
//!
//! 1. `default_values`
//! 2. `values.<environment>`
//! 3. `resource_profiles.<profile>`
//! 4. the context's `global` block, as `--set global.*=...` settings
//!
//! The templating engine does the actual merge; [`OverlaySet::merged_values`]
//! reproduces it for previews.

use ankh_core::{ChartDescriptor, Context, Value, flatten_under, parse_set_values};
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};

/// Where an overlay file came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayKind {
    Defaults,
    Environment(String),
    ResourceProfile(String),
}

impl OverlayKind {
    /// Descriptor field the overlay was read from
    pub fn label(&self) -> String {
        match self {
            OverlayKind::Defaults => "default_values".to_string(),
            OverlayKind::Environment(env) => format!("values.{}", env),
            OverlayKind::ResourceProfile(profile) => format!("resource_profiles.{}", profile),
        }
    }

    fn file_name(&self) -> String {
        match self {
            OverlayKind::Defaults => "default-values.yaml".to_string(),
            OverlayKind::Environment(env) => format!("values-{}.yaml", env),
            OverlayKind::ResourceProfile(profile) => format!("resource-profile-{}.yaml", profile),
        }
    }
}

/// An overlay written to the chart's workspace directory
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFile {
    pub kind: OverlayKind,
    pub path: PathBuf,
    pub values: Value,
}

/// Ordered overlays for one chart, lowest precedence first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlaySet {
    pub files: Vec<OverlayFile>,

    /// `key=value` settings applied after every file
    pub settings: Vec<String>,
}

impl OverlaySet {
    pub fn value_files(&self) -> Vec<&Path> {
        self.files.iter().map(|f| f.path.as_path()).collect()
    }

    /// Effective values after merging files then settings
    pub fn merged_values(&self) -> Result<Value> {
        let mut merged = Value::mapping();
        for file in &self.files {
            merged.merge(&file.values);
        }
        merged.merge(&parse_set_values(&self.settings)?);
        Ok(merged)
    }
}

/// Compute and write the overlays for `chart` under `chart_dir`
pub fn resolve_overlays(
    chart: &ChartDescriptor,
    context: &Context,
    chart_dir: &Path,
) -> Result<OverlaySet> {
    let candidates = [
        (OverlayKind::Defaults, chart.default_values.as_ref()),
        (
            OverlayKind::Environment(context.environment.clone()),
            chart.values_for(&context.environment),
        ),
        (
            OverlayKind::ResourceProfile(context.resource_profile.clone()),
            chart.resource_profile(&context.resource_profile),
        ),
    ];

    let mut files = Vec::new();
    for (kind, values) in candidates {
        let Some(values) = values.filter(|v| !v.is_null()) else {
            continue;
        };
        files.push(write_overlay(chart, kind, values, chart_dir)?);
    }

    let settings = flatten_under(&context.global, "global");

    tracing::debug!(
        chart = %chart.name,
        files = files.len(),
        settings = settings.len(),
        "resolved overlays"
    );

    Ok(OverlaySet { files, settings })
}

fn write_overlay(
    chart: &ChartDescriptor,
    kind: OverlayKind,
    values: &Value,
    chart_dir: &Path,
) -> Result<OverlayFile> {
    if !matches!(values, Value::Mapping(_)) {
        return Err(EngineError::OverlayShape {
            chart: chart.name.clone(),
            overlay: kind.label(),
            found: values.kind(),
        });
    }

    let content = serde_yaml::to_string(values).map_err(|source| EngineError::OverlaySerialize {
        chart: chart.name.clone(),
        overlay: kind.label(),
        source,
    })?;

    let path = chart_dir.join(kind.file_name());
    std::fs::write(&path, content).map_err(|source| EngineError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(OverlayFile {
        kind,
        path,
        values: values.clone(),
    })
}
