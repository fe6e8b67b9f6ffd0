//! Config command - validate the global config and show the current context

use ankh_core::{GlobalConfig, RunConfig};
use console::style;

use crate::error::Result;

pub fn run(run: &RunConfig) -> Result<()> {
    let config = GlobalConfig::load(&run.config_path)?.validate()?;
    let current = config.current_context();

    println!(
        "{} {} is valid",
        style("✓").green().bold(),
        run.config_path.display()
    );
    println!();
    println!("{} {}", style("Current context:").bold(), style(&current.name).cyan());
    println!("  kube_context:      {}", current.kube_context);
    println!("  environment:       {}", current.environment);
    println!("  resource_profile:  {}", current.resource_profile);
    println!("  helm_registry_url: {}", current.helm_registry_url);
    println!("  cluster_admin:     {}", current.cluster_admin);

    let others: Vec<&str> = config
        .config()
        .contexts
        .keys()
        .map(String::as_str)
        .filter(|name| *name != current.name)
        .collect();
    if !others.is_empty() {
        println!();
        println!("{} {}", style("Other contexts:").bold(), others.join(", "));
    }

    Ok(())
}
