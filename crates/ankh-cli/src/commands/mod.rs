//! Command implementations

pub mod apply;
pub mod config;
pub mod template;

use ankh_core::{DESCRIPTOR_FILE, RunConfig, UnitDescriptor, ValidatedConfig};
use ankh_engine::{Assembler, HelmTemplate, Renderer};
use ankh_repo::HttpChartFetcher;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

use crate::error::{CliError, Result};

/// Options shared by every command that renders a unit
#[derive(Args, Debug, Clone)]
pub struct UnitArgs {
    /// Unit descriptor to start from
    #[arg(short = 'f', long, default_value = DESCRIPTOR_FILE)]
    pub filename: PathBuf,

    /// helm binary used for templating
    #[arg(long, env = "ANKH_HELM", default_value = "helm")]
    pub helm: PathBuf,

    /// Skip TLS certificate checks when fetching charts
    #[arg(long)]
    pub insecure_skip_tls_verify: bool,
}

/// A rendered unit tree
pub struct Rendered {
    pub config: ValidatedConfig,
    pub unit: UnitDescriptor,
    pub manifests: String,
}

/// Validate the config, load the unit tree and render every chart in it
pub fn render(run: &RunConfig, args: &UnitArgs) -> Result<Rendered> {
    let config = run.prepare()?;
    let unit = UnitDescriptor::load(&args.filename)?;

    tracing::debug!(
        context = %config.current_context().name,
        units = unit.unit_count(),
        workspace = %run.workspace.root().display(),
        "loaded unit tree"
    );

    let fetcher = HttpChartFetcher::builder()
        .insecure_skip_tls(args.insecure_skip_tls_verify)
        .build()
        .map_err(CliError::Registry)?;
    let renderer = Renderer::new(
        &config,
        &run.workspace,
        HelmTemplate::new(&args.helm),
        fetcher,
    );
    let manifests = Assembler::new(&config, renderer).assemble(&unit)?;

    Ok(Rendered {
        config,
        unit,
        manifests,
    })
}

pub(crate) fn write_stdout(content: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(content.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(CliError::Output)
}
