//! Row kernels shared by every backend.
//!
//! Each function computes one output row from read-only inputs of the
//! previous state, so rows can be scheduled in any order or in parallel.
//! Boundary convention: forward differences are zero on the high side,
//! backward differences read zero below index 0, which makes
//! [`divergence_row`] the negative adjoint of [`gradient_row`].

use inpaint_core::Float2;

/// Operator norm of the 2D forward-difference gradient with unit spacing.
pub const GRADIENT_NORM: f32 = 2.0 * std::f32::consts::SQRT_2;

/// Post-processing applied to the dual variable after the ascent step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DualProjection {
    /// Plain Huber step `p = (p + σ∇u) / (1 + σα)`.
    #[default]
    None,
    /// Additionally rescale `p` into the unit ball.
    UnitBall,
}

#[inline]
fn row_of<T>(data: &[T], width: usize, y: usize) -> &[T] {
    &data[y * width..(y + 1) * width]
}

/// Forward-difference gradient at `x` given the current row and the row below.
#[inline]
fn forward_diff(row: &[f32], below: Option<&[f32]>, x: usize) -> Float2 {
    let c = row[x];
    let dx = if x + 1 < row.len() { row[x + 1] - c } else { 0.0 };
    let dy = below.map_or(0.0, |b| b[x] - c);
    Float2::new(dx, dy)
}

/// `out = src * scale + bias`.
pub fn scale_bias_row(out: &mut [f32], src: &[u8], scale: f32, bias: f32) {
    for (d, &s) in out.iter_mut().zip(src) {
        *d = s as f32 * scale + bias;
    }
}

/// Forward-difference gradient of row `y` of `u`.
pub fn gradient_row(out: &mut [Float2], u: &[f32], width: usize, height: usize, y: usize) {
    let row = row_of(u, width, y);
    let below = (y + 1 < height).then(|| row_of(u, width, y + 1));
    for (x, g) in out.iter_mut().enumerate() {
        *g = forward_diff(row, below, x);
    }
}

/// Backward-difference divergence of row `y` of `p`.
pub fn divergence_row(out: &mut [f32], p: &[Float2], width: usize, y: usize) {
    let row = row_of(p, width, y);
    let above = (y > 0).then(|| row_of(p, width, y - 1));
    for (x, d) in out.iter_mut().enumerate() {
        let mut div = row[x].x + row[x].y;
        if x > 0 {
            div -= row[x - 1].x;
        }
        if let Some(a) = above {
            div -= a[x].y;
        }
        *d = div;
    }
}

/// Huber dual ascent on row `y` of `p`, in place.
#[allow(clippy::too_many_arguments)]
pub fn dual_ascent_row(
    p_row: &mut [Float2],
    u: &[f32],
    width: usize,
    height: usize,
    y: usize,
    sigma: f32,
    alpha: f32,
    projection: DualProjection,
) {
    let row = row_of(u, width, y);
    let below = (y + 1 < height).then(|| row_of(u, width, y + 1));
    let damping = 1.0 / (1.0 + sigma * alpha);
    for (x, p) in p_row.iter_mut().enumerate() {
        let grad = forward_diff(row, below, x);
        let mut np = (*p + grad * sigma) * damping;
        if projection == DualProjection::UnitBall {
            np = np / np.length().max(1.0);
        }
        *p = np;
    }
}

/// Weighted L2 primal descent on one row of `u`, in place.
pub fn primal_descent_row(
    u_row: &mut [f32],
    divp: &[f32],
    g: &[f32],
    lambda: &[f32],
    tau: f32,
    lambda_global: f32,
) {
    for (((u, &d), &g), &l) in u_row.iter_mut().zip(divp).zip(g).zip(lambda) {
        let weight = lambda_global * l;
        *u = (*u + tau * (d + weight * g)) / (1.0 + tau * weight);
    }
}

/// Sets pixels of row `y` inside the closed disk to `value`.
pub fn paint_disk_row(row: &mut [f32], y: usize, value: f32, cx: f32, cy: f32, radius: f32) {
    let dy = y as f32 - cy;
    let r2 = radius * radius;
    if dy * dy > r2 {
        return;
    }
    for (x, v) in row.iter_mut().enumerate() {
        let dx = x as f32 - cx;
        if dx * dx + dy * dy <= r2 {
            *v = value;
        }
    }
}

/// Max-reduction step for residuals. A NaN operand wins, so a diverged
/// iterate never reads as converged.
#[inline]
pub fn nan_max(acc: f32, d: f32) -> f32 {
    if d.is_nan() || d > acc { d } else { acc }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use inpaint_core::Element;

    #[test]
    fn test_nan_max_propagates() {
        assert_eq!(nan_max(0.5, 0.25), 0.5);
        assert!(nan_max(0.5, f32::NAN).is_nan());
        assert!(nan_max(f32::NAN, 0.5).is_nan());
        assert_eq!(nan_max(0.0, f32::INFINITY), f32::INFINITY);
    }

    #[test]
    fn test_gradient_zero_on_high_side() {
        // 3x2: [0 1 3]
        //      [2 2 2]
        let u = [0.0, 1.0, 3.0, 2.0, 2.0, 2.0];
        let mut top = [Float2::ZERO; 3];
        gradient_row(&mut top, &u, 3, 2, 0);
        assert_eq!(top[0], Float2::new(1.0, 2.0));
        assert_eq!(top[2], Float2::new(0.0, -1.0));

        let mut bottom = [Float2::ZERO; 3];
        gradient_row(&mut bottom, &u, 3, 2, 1);
        assert!(bottom.iter().all(|g| *g == Float2::ZERO));
    }

    #[test]
    fn test_divergence_reads_zero_outside() {
        let p = [Float2::new(1.0, 1.0); 4];
        let mut r0 = [0.0; 2];
        let mut r1 = [0.0; 2];
        divergence_row(&mut r0, &p, 2, 0);
        divergence_row(&mut r1, &p, 2, 1);
        assert_eq!(r0, [2.0, 1.0]);
        assert_eq!(r1, [1.0, 0.0]);
    }

    #[test]
    fn test_dual_ascent_formula() {
        let u = [0.0, 1.0];
        let mut p = [Float2::new(0.5, 0.0), Float2::ZERO];
        dual_ascent_row(&mut p, &u, 2, 1, 0, 0.5, 0.2, DualProjection::None);
        // (0.5 + 0.5 * 1) / (1 + 0.1)
        assert_relative_eq!(p[0].x, 1.0 / 1.1, epsilon = 1e-6);
        assert_eq!(p[1], Float2::ZERO);
    }

    #[test]
    fn test_dual_ascent_unit_ball() {
        let u = [0.0, 10.0];
        let mut p = [Float2::ZERO; 2];
        dual_ascent_row(&mut p, &u, 2, 1, 0, 1.0, 0.0, DualProjection::UnitBall);
        assert_relative_eq!(p[0].length(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_primal_descent_zero_weight_ignores_data() {
        let mut u = [0.25];
        primal_descent_row(&mut u, &[0.5], &[1000.0], &[0.0], 0.1, 1.2);
        assert_relative_eq!(u[0], 0.25 + 0.05, epsilon = 1e-6);
    }

    #[test]
    fn test_paint_disk_row_inclusive() {
        let mut row = [1.0; 10];
        paint_disk_row(&mut row, 3, 0.0, 5.0, 5.0, 2.0);
        // dy = -2: only x = 5 is at distance exactly 2
        assert_eq!(row.iter().filter(|v| **v == 0.0).count(), 1);
        assert_eq!(row[5], 0.0);
    }
}
