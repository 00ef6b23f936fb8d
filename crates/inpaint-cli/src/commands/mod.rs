//! CLI command implementations

pub mod backends;
pub mod config;
pub mod run;

use anyhow::{Context, Result};
use inpaint_solver::Config;
use std::path::Path;
use tracing::warn;

/// Load configuration from path, or defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Warn when the step sizes violate sigma * tau * L^2 <= 1
pub fn warn_if_unstable(config: &Config) -> bool {
    let params = &config.solver;
    if params.is_step_stable() {
        return false;
    }
    warn!(
        sigma = params.sigma,
        tau = params.tau,
        product = params.step_product(),
        "step sizes violate sigma*tau*8 <= 1, output may oscillate or diverge"
    );
    true
}
