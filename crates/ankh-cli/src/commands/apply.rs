//! Apply and delete commands - pipe the assembled manifests to kubectl

use ankh_core::RunConfig;
use ankh_engine::{Kubectl, KubectlAction};
use console::style;
use std::path::Path;

use super::UnitArgs;
use crate::error::Result;

pub fn run(run: &RunConfig, args: &UnitArgs, kubectl: &Path, action: KubectlAction) -> Result<()> {
    let rendered = super::render(run, args)?;
    let context = rendered.config.current_context();

    if rendered.manifests.trim().is_empty() {
        eprintln!(
            "{} Nothing to {}: no charts rendered from {}",
            style("!").yellow().bold(),
            action,
            args.filename.display()
        );
        return Ok(());
    }

    let output = Kubectl::new(kubectl).execute(
        action,
        &rendered.manifests,
        &context.kube_context,
        &rendered.unit.namespace,
    )?;
    super::write_stdout(&output)?;

    eprintln!(
        "{} {} finished for context {} in namespace {}",
        style("✓").green().bold(),
        action,
        style(&context.name).cyan(),
        style(&rendered.unit.namespace).cyan()
    );

    Ok(())
}
