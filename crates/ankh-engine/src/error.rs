//! Engine error types

use ankh_core::CoreError;
use ankh_repo::FetchError;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Main engine error type
#[derive(Error, Debug, Diagnostic)]
pub enum EngineError {
    #[error(transparent)]
    #[diagnostic(code(ankh::core))]
    Core(#[from] CoreError),

    #[error("overlay `{overlay}` for chart '{chart}' must be a mapping, found a {found}")]
    #[diagnostic(
        code(ankh::overlay::shape),
        help("overlays are merged into the chart's values, so each one has to be a YAML mapping")
    )]
    OverlayShape {
        chart: String,
        overlay: String,
        found: &'static str,
    },

    #[error("unable to serialize overlay `{overlay}` for chart '{chart}'")]
    #[diagnostic(code(ankh::overlay::serialize))]
    OverlaySerialize {
        chart: String,
        overlay: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unable to write {}", path.display())]
    #[diagnostic(code(ankh::io))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to run `{program}`")]
    #[diagnostic(
        code(ankh::process::spawn),
        help("check that the program is installed and on your PATH")
    )]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "error running {program} for chart '{chart}' from {} ({status}):\n{output}",
        unit.display()
    )]
    #[diagnostic(code(ankh::render::failed))]
    Render {
        chart: String,
        unit: PathBuf,
        program: String,
        status: String,
        output: String,
    },

    #[error("unable to fetch chart '{chart}' version '{version}'")]
    #[diagnostic(
        code(ankh::render::fetch),
        help("add the chart under `charts/` next to the descriptor or publish it to the context's registry")
    )]
    Fetch {
        chart: String,
        version: String,
        #[source]
        source: FetchError,
    },

    #[error("error running {program} {action} in namespace '{namespace}' ({status}):\n{output}")]
    #[diagnostic(code(ankh::apply::failed))]
    Apply {
        program: String,
        action: String,
        namespace: String,
        status: String,
        output: String,
    },
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
