//! Template command - print the assembled manifests

use ankh_core::RunConfig;

use super::UnitArgs;
use crate::error::Result;

pub fn run(run: &RunConfig, args: &UnitArgs) -> Result<()> {
    let rendered = super::render(run, args)?;
    super::write_stdout(&rendered.manifests)
}
