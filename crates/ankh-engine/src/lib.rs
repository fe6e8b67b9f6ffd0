//! ankh rendering pipeline
//!
//! Turns a loaded unit tree into one manifest stream:
//!
//! - [`overlay`] writes each chart's value overlays into the run workspace
//! - [`render`] runs the templating engine for a single chart
//! - [`assemble`] walks the tree and concatenates the results
//! - [`kubectl`] hands the result to the cluster

pub mod assemble;
pub mod error;
pub mod kubectl;
pub mod overlay;
pub mod process;
pub mod render;

pub use assemble::Assembler;
pub use error::{EngineError, Result};
pub use kubectl::{Kubectl, KubectlAction};
pub use overlay::{OverlayFile, OverlayKind, OverlaySet, resolve_overlays};
pub use process::ProcessOutput;
pub use render::{
    ChartRenderer, ChartSource, HelmTemplate, Renderer, TemplateEngine, TemplateRequest,
};
