//! Chart rendering through an external templating engine

use ankh_core::{ChartDescriptor, UnitDescriptor, ValidatedConfig, Workspace};
use ankh_repo::{ChartFetcher, archive_file_name};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};
use crate::overlay::resolve_overlays;
use crate::process::{self, ProcessOutput};

/// Everything the templating engine needs for one chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRequest<'a> {
    pub kube_context: &'a str,
    pub namespace: &'a str,
    /// Value files, lowest precedence first
    pub value_files: Vec<&'a Path>,
    /// `key=value` settings applied after the files
    pub settings: &'a [String],
    /// Chart directory or packaged archive
    pub chart: &'a Path,
}

/// An external templating engine
pub trait TemplateEngine {
    /// Program name, for diagnostics
    fn name(&self) -> &str;

    fn template(&self, request: &TemplateRequest<'_>) -> Result<ProcessOutput>;
}

impl<T: TemplateEngine + ?Sized> TemplateEngine for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn template(&self, request: &TemplateRequest<'_>) -> Result<ProcessOutput> {
        (**self).template(request)
    }
}

/// `helm template`
#[derive(Debug, Clone)]
pub struct HelmTemplate {
    program: PathBuf,
    name: String,
}

impl Default for HelmTemplate {
    fn default() -> Self {
        Self::new("helm")
    }
}

impl HelmTemplate {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let name = program.display().to_string();
        Self { program, name }
    }

    /// Command line for a request
    pub fn args(&self, request: &TemplateRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "template".into(),
            "--kube-context".into(),
            request.kube_context.into(),
            "--namespace".into(),
            request.namespace.into(),
        ];

        for file in &request.value_files {
            args.push("-f".into());
            args.push(file.as_os_str().to_owned());
        }

        for setting in request.settings {
            args.push("--set".into());
            args.push(setting.into());
        }

        args.push(request.chart.as_os_str().to_owned());
        args
    }
}

impl TemplateEngine for HelmTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn template(&self, request: &TemplateRequest<'_>) -> Result<ProcessOutput> {
        process::run(self.program.as_os_str(), self.args(request), None)
    }
}

/// Where a chart's source was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartSource {
    /// `charts/<name>` next to the descriptor
    Local(PathBuf),
    /// Archive fetched from the registry into the workspace
    Fetched(PathBuf),
}

impl ChartSource {
    pub fn path(&self) -> &Path {
        match self {
            ChartSource::Local(path) | ChartSource::Fetched(path) => path,
        }
    }
}

/// Renders one chart of one unit to manifest text
pub trait ChartRenderer {
    fn render_chart(&self, chart: &ChartDescriptor, unit: &UnitDescriptor) -> Result<String>;
}

impl<T: ChartRenderer + ?Sized> ChartRenderer for &T {
    fn render_chart(&self, chart: &ChartDescriptor, unit: &UnitDescriptor) -> Result<String> {
        (**self).render_chart(chart, unit)
    }
}

/// Renders charts against the current context
pub struct Renderer<'a, E, F> {
    config: &'a ValidatedConfig,
    workspace: &'a Workspace,
    engine: E,
    fetcher: F,
}

impl<'a, E: TemplateEngine, F: ChartFetcher> Renderer<'a, E, F> {
    pub fn new(
        config: &'a ValidatedConfig,
        workspace: &'a Workspace,
        engine: E,
        fetcher: F,
    ) -> Self {
        Self {
            config,
            workspace,
            engine,
            fetcher,
        }
    }

    /// Local chart directory if present, otherwise fetch the packaged chart
    pub fn resolve_source(
        &self,
        chart: &ChartDescriptor,
        unit: &UnitDescriptor,
        chart_dir: &Path,
    ) -> Result<ChartSource> {
        let local = unit.local_chart_dir(&chart.name);
        if local.is_dir() {
            return Ok(ChartSource::Local(local));
        }

        let registry = &self.config.current_context().helm_registry_url;
        let data = self
            .fetcher
            .fetch(registry, &chart.name, &chart.version)
            .map_err(|source| EngineError::Fetch {
                chart: chart.name.clone(),
                version: chart.version.clone(),
                source,
            })?;

        let archive = chart_dir.join(archive_file_name(&chart.name, &chart.version));
        std::fs::write(&archive, data).map_err(|source| EngineError::Write {
            path: archive.clone(),
            source,
        })?;

        Ok(ChartSource::Fetched(archive))
    }
}

impl<E: TemplateEngine, F: ChartFetcher> ChartRenderer for Renderer<'_, E, F> {
    fn render_chart(&self, chart: &ChartDescriptor, unit: &UnitDescriptor) -> Result<String> {
        let context = self.config.current_context();

        tracing::info!(chart = %chart.name, path = %unit.path.display(), "starting chart");

        let chart_dir = self.workspace.chart_dir(&chart.name)?;
        let overlays = resolve_overlays(chart, context, &chart_dir)?;
        let values = overlays.merged_values()?.to_yaml()?;
        tracing::debug!(chart = %chart.name, %values, "effective values");

        let source = self.resolve_source(chart, unit, &chart_dir)?;

        let request = TemplateRequest {
            kube_context: &context.kube_context,
            namespace: &unit.namespace,
            value_files: overlays.value_files(),
            settings: &overlays.settings,
            chart: source.path(),
        };

        let output = self.engine.template(&request)?;
        if !output.success() {
            return Err(EngineError::Render {
                chart: chart.name.clone(),
                unit: unit.path.clone(),
                program: self.engine.name().to_string(),
                status: output.describe_status(),
                output: output.combined(),
            });
        }

        // Manifests are stdout alone; helm prints warnings on stderr even on success.
        if !output.stderr.trim().is_empty() {
            tracing::warn!(
                chart = %chart.name,
                stderr = %output.stderr.trim(),
                "templating engine reported warnings"
            );
        }

        tracing::debug!(chart = %chart.name, bytes = output.stdout.len(), "rendered chart");

        Ok(output.stdout)
    }
}
