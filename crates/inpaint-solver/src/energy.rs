//! Huber-ROF objective for monitoring convergence.
//!
//! `E(u) = Σ Huber_α(|∇u|) + Σ (λ_global·λ/2)(u − g)²`
//!
//! Evaluated on whatever residency the fields live in; the session calls it
//! between ticks. Accumulates in `f64`.

use inpaint_core::{Field, Residency};

use crate::config::SolverParams;
use crate::error::SolverResult;

/// Huber norm: quadratic below `alpha`, linear above.
#[inline]
pub fn huber(t: f32, alpha: f32) -> f32 {
    if alpha > 0.0 && t <= alpha {
        t * t / (2.0 * alpha)
    } else {
        t - alpha / 2.0
    }
}

/// Objective split into its two terms.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Energy {
    /// Huber total-variation term.
    pub regularizer: f64,
    /// Weighted L2 data term.
    pub data: f64,
}

impl Energy {
    /// Sum of both terms.
    pub fn total(&self) -> f64 {
        self.regularizer + self.data
    }
}

/// Evaluates the Huber-ROF energy of `u` against `g` under mask `lambda`.
pub fn huber_rof_energy<R: Residency>(
    u: &Field<f32, R>,
    g: &Field<f32, R>,
    lambda: &Field<f32, R>,
    params: &SolverParams,
) -> SolverResult<Energy> {
    u.ensure_same_shape(g)?;
    u.ensure_same_shape(lambda)?;

    let (w, h) = u.dimensions();
    let mut energy = Energy::default();
    for y in 0..h {
        let row = u.row(y);
        let below = (y + 1 < h).then(|| u.row(y + 1));
        let (g_row, l_row) = (g.row(y), lambda.row(y));
        for x in 0..w as usize {
            let dx = if x + 1 < w as usize { row[x + 1] - row[x] } else { 0.0 };
            let dy = below.map_or(0.0, |b| b[x] - row[x]);
            energy.regularizer += huber(dx.hypot(dy), params.alpha) as f64;

            let r = (row[x] - g_row[x]) as f64;
            energy.data += 0.5 * (params.lambda * l_row[x]) as f64 * r * r;
        }
    }
    Ok(energy)
}
