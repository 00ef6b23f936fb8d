//! Config command: prints the default configuration or validates a file.

use crate::ConfigArgs;
use anyhow::{Context, Result};
use inpaint_solver::Config;
use tracing::info;

pub fn run(args: ConfigArgs, verbose: u8) -> Result<()> {
    if let Some(path) = &args.check {
        let config = super::load_config(Some(path))?;
        let unstable = super::warn_if_unstable(&config);
        println!("{}: ok", path.display());
        if verbose > 0 || unstable {
            println!(
                "  sigma*tau*L^2 = {:.4}{}",
                config.solver.step_product(),
                if unstable { " (unstable)" } else { "" }
            );
        }
        return Ok(());
    }

    let yaml = Config::default().to_yaml()?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &yaml)
                .with_context(|| format!("Failed to write: {}", path.display()))?;
            info!(path = %path.display(), "wrote default config");
        }
        None => print!("{yaml}"),
    }
    Ok(())
}
