//! ankh CLI - deploy trees of helm charts with per-context value overlays

use ankh_core::RunConfig;
use ankh_engine::KubectlAction;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod error;
mod exit_codes;

use commands::UnitArgs;
use error::Result;

#[derive(Parser)]
#[command(name = "ankh")]
#[command(version)]
#[command(about = "Deploy trees of helm charts with per-context value overlays", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Global config file [default: ~/.ankh/config]
    #[arg(long, global = true, env = "ANKH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every chart in the unit tree and print the manifests
    Template {
        #[command(flatten)]
        unit: UnitArgs,
    },

    /// Render the unit tree and apply it with kubectl
    Apply {
        #[command(flatten)]
        unit: UnitArgs,

        /// kubectl binary
        #[arg(long, env = "ANKH_KUBECTL", default_value = "kubectl")]
        kubectl: PathBuf,
    },

    /// Render the unit tree and delete its resources with kubectl
    Delete {
        #[command(flatten)]
        unit: UnitArgs,

        /// kubectl binary
        #[arg(long, env = "ANKH_KUBECTL", default_value = "kubectl")]
        kubectl: PathBuf,
    },

    /// Validate the global config and show the current context
    Config,
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();

    let filter = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_ansi(console::user_attended_stderr())
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    let run_config = RunConfig::from_env(cli.config)?;

    match cli.command {
        Commands::Template { unit } => commands::template::run(&run_config, &unit),
        Commands::Apply { unit, kubectl } => {
            commands::apply::run(&run_config, &unit, &kubectl, KubectlAction::Apply)
        }
        Commands::Delete { unit, kubectl } => {
            commands::apply::run(&run_config, &unit, &kubectl, KubectlAction::Delete)
        }
        Commands::Config => commands::config::run(&run_config),
    }
}
