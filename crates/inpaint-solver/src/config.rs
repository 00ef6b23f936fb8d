//! Session configuration.
//!
//! Loaded from YAML; every key is optional and falls back to the defaults
//! of the interactive demo:
//!
//! ```yaml
//! solver:
//!   sigma: 0.35355339
//!   tau: 0.35355339
//!   lambda: 1.2
//!   alpha: 0.002
//! brush:
//!   radius: 10.0
//!   value: 0.0
//! inner_iterations: 10
//! tolerance: 1.0e-4        # optional early stop
//! dual_projection: none    # or unit_ball
//! start_running: true
//! backend: auto            # auto | cpu | serial
//! threads: 0               # 0 = rayon default
//! ```

use std::path::Path;

use inpaint_compute::{Backend, DualProjection, GRADIENT_NORM};
use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

/// Inner iterations per tick in the interactive demo.
pub const DEFAULT_INNER_ITERATIONS: usize = 10;

/// Primal-dual parameters of the Huber-ROF model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// Dual step size.
    pub sigma: f32,
    /// Primal step size.
    pub tau: f32,
    /// Global data-fidelity weight, multiplied by the per-pixel mask.
    pub lambda: f32,
    /// Huber smoothing parameter.
    pub alpha: f32,
}

impl Default for SolverParams {
    fn default() -> Self {
        let step = 1.0 / GRADIENT_NORM;
        Self {
            sigma: step,
            tau: step,
            lambda: 1.2,
            alpha: 0.002,
        }
    }
}

impl SolverParams {
    /// `σ·τ·L²` with `L = sqrt(8)`.
    pub fn step_product(&self) -> f32 {
        self.sigma * self.tau * GRADIENT_NORM * GRADIENT_NORM
    }

    /// Whether the step sizes satisfy `σ·τ·L² ≤ 1`.
    ///
    /// Never enforced: larger steps run, they just oscillate or diverge.
    pub fn is_step_stable(&self) -> bool {
        // 1/sqrt(8) squared times 8 rounds slightly above 1 in f32
        self.step_product() <= 1.0 + 1e-5
    }
}

/// Mask brush applied while the pointer is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    /// Disk radius in pixels.
    pub radius: f32,
    /// Mask value written inside the disk (0 = unknown).
    pub value: f32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            value: 0.0,
        }
    }
}

/// Full session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model parameters.
    pub solver: SolverParams,
    /// Mask brush.
    pub brush: BrushConfig,
    /// Primal-dual iterations per tick.
    pub inner_iterations: usize,
    /// Stop a tick early once `max |u_k - u_{k-1}|` drops below this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f32>,
    /// Post-processing of the dual variable.
    pub dual_projection: DualProjection,
    /// Start in continuous run mode.
    pub start_running: bool,
    /// Compute backend.
    pub backend: Backend,
    /// CPU worker threads (0 = rayon default).
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solver: SolverParams::default(),
            brush: BrushConfig::default(),
            inner_iterations: DEFAULT_INNER_ITERATIONS,
            tolerance: None,
            dual_projection: DualProjection::None,
            start_running: true,
            backend: Backend::Auto,
            threads: 0,
        }
    }
}

impl Config {
    /// Loads and validates a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> SolverResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SolverError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parses and validates a YAML configuration.
    pub fn from_yaml_str(yaml: &str) -> SolverResult<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Serializes to YAML.
    pub fn to_yaml(&self) -> SolverResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Writes the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> SolverResult<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Rejects non-finite or out-of-range values.
    ///
    /// The step-size bound is not checked here; see
    /// [`SolverParams::is_step_stable`].
    pub fn validate(&self) -> SolverResult<()> {
        let s = &self.solver;
        positive("sigma", s.sigma)?;
        positive("tau", s.tau)?;
        non_negative("lambda", s.lambda)?;
        non_negative("alpha", s.alpha)?;
        positive("brush.radius", self.brush.radius)?;
        if !self.brush.value.is_finite() {
            return Err(SolverError::invalid("brush.value", "must be finite"));
        }
        if self.inner_iterations == 0 {
            return Err(SolverError::invalid("inner_iterations", "must be at least 1"));
        }
        if let Some(tol) = self.tolerance {
            positive("tolerance", tol)?;
        }
        Ok(())
    }
}

fn positive(name: &'static str, v: f32) -> SolverResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(SolverError::invalid(name, format!("must be finite and > 0, got {v}")));
    }
    Ok(())
}

fn non_negative(name: &'static str, v: f32) -> SolverResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(SolverError::invalid(name, format!("must be finite and >= 0, got {v}")));
    }
    Ok(())
}
