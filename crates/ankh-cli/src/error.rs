//! CLI error type and its exit codes

use ankh_core::CoreError;
use ankh_engine::EngineError;
use ankh_repo::FetchError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),

    #[error("unable to set up the chart registry client")]
    #[diagnostic(code(ankh::cli::registry))]
    Registry(#[source] FetchError),

    #[error("unable to write output")]
    #[diagnostic(code(ankh::cli::output))]
    Output(#[source] std::io::Error),
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::Engine(err.into())
    }
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(err) => engine_exit_code(err),
            CliError::Registry(_) => exit_codes::ERROR,
            CliError::Output(_) => exit_codes::IO_ERROR,
        }
    }
}

fn engine_exit_code(err: &EngineError) -> i32 {
    match err {
        EngineError::Core(core) if core.is_validation_error() => exit_codes::VALIDATION_ERROR,
        EngineError::Core(core) if core.is_load_error() => exit_codes::DESCRIPTOR_ERROR,
        EngineError::Core(CoreError::Workspace { .. } | CoreError::NoHomeDirectory) => {
            exit_codes::IO_ERROR
        }
        EngineError::Core(_) => exit_codes::ERROR,
        EngineError::OverlayShape { .. }
        | EngineError::OverlaySerialize { .. }
        | EngineError::Render { .. }
        | EngineError::Fetch { .. } => exit_codes::TEMPLATE_ERROR,
        EngineError::Write { .. } => exit_codes::IO_ERROR,
        EngineError::Spawn { .. } => exit_codes::UNAVAILABLE,
        EngineError::Apply { .. } => exit_codes::APPLY_ERROR,
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
