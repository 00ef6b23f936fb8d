//! Kernel primitives abstraction for unified backend implementation.

use inpaint_core::{Device, Element, Field, Float2, Host};

use super::DeviceLimits;
use super::kernels::{self, DualProjection};
use crate::{ComputeError, ComputeResult};

/// Core data-parallel operations.
///
/// A backend supplies the row scheduler ([`for_each_row`](Self::for_each_row)),
/// a reduction and its limits; all solver kernels are provided methods built
/// on top. Every kernel either writes a destination distinct from its inputs
/// or performs an element-local in-place update, so rows never race.
pub trait KernelPrimitives: Send + Sync {
    /// Runs `f(y, row)` for every row of `dst`.
    fn for_each_row<T, F>(&self, dst: &mut Field<T, Device>, f: F)
    where
        T: Element,
        F: Fn(usize, &mut [T]) + Send + Sync;

    /// `max |a - b|` over all elements (0 for empty fields).
    fn max_abs_diff(&self, a: &Field<f32, Device>, b: &Field<f32, Device>) -> ComputeResult<f32>;

    /// Resource limits.
    fn limits(&self) -> &DeviceLimits;

    /// Backend name.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Buffers
    // =========================================================================

    /// Allocates a zero-filled device field.
    fn allocate<T: Element>(&self, width: u32, height: u32) -> ComputeResult<Field<T, Device>> {
        if width == 0 || height == 0 {
            return Err(ComputeError::InvalidDimensions(width, height));
        }
        let requested = (width as u64)
            .checked_mul(height as u64)
            .and_then(|n| n.checked_mul(std::mem::size_of::<T>() as u64))
            .ok_or(ComputeError::BufferTooLarge {
                requested: u64::MAX,
                limit: self.limits().max_buffer_bytes,
            })?;
        self.limits().check(requested)?;
        Ok(Field::new(width, height))
    }

    /// Host to device transfer. Blocks until `dst` holds the data.
    fn upload<T: Element>(&self, src: &Field<T, Host>, dst: &mut Field<T, Device>) -> ComputeResult<()> {
        dst.ensure_same_shape(src)?;
        dst.data_mut().copy_from_slice(src.data());
        Ok(())
    }

    /// Device to host transfer. Blocks until `dst` holds the data.
    fn download<T: Element>(&self, src: &Field<T, Device>, dst: &mut Field<T, Host>) -> ComputeResult<()> {
        dst.ensure_same_shape(src)?;
        dst.data_mut().copy_from_slice(src.data());
        Ok(())
    }

    // =========================================================================
    // Elementwise
    // =========================================================================

    /// `dst = src * scale + bias`.
    fn exec_scale_bias(&self, dst: &mut Field<f32, Device>, src: &Field<u8, Device>,
                       scale: f32, bias: f32) -> ComputeResult<()> {
        dst.ensure_same_shape(src)?;
        let w = src.width() as usize;
        let data = src.data();
        self.for_each_row(dst, |y, row| {
            kernels::scale_bias_row(row, &data[y * w..(y + 1) * w], scale, bias);
        });
        Ok(())
    }

    /// Sets every element of `dst` to `value`.
    fn exec_fill<T: Element>(&self, dst: &mut Field<T, Device>, value: T) -> ComputeResult<()> {
        self.for_each_row(dst, |_, row| row.fill(value));
        Ok(())
    }

    /// Copies `src` into `dst`.
    fn exec_copy<T: Element>(&self, dst: &mut Field<T, Device>, src: &Field<T, Device>) -> ComputeResult<()> {
        dst.ensure_same_shape(src)?;
        let w = src.width() as usize;
        let data = src.data();
        self.for_each_row(dst, |y, row| row.copy_from_slice(&data[y * w..(y + 1) * w]));
        Ok(())
    }

    // =========================================================================
    // Gradient / divergence
    // =========================================================================

    /// Forward-difference gradient of `u` into `dst`.
    fn exec_gradient(&self, dst: &mut Field<Float2, Device>, u: &Field<f32, Device>) -> ComputeResult<()> {
        dst.ensure_same_shape(u)?;
        let (w, h) = (u.width() as usize, u.height() as usize);
        let data = u.data();
        self.for_each_row(dst, |y, row| kernels::gradient_row(row, data, w, h, y));
        Ok(())
    }

    /// Backward-difference divergence of `p` into `dst`.
    fn exec_divergence(&self, dst: &mut Field<f32, Device>, p: &Field<Float2, Device>) -> ComputeResult<()> {
        dst.ensure_same_shape(p)?;
        let w = p.width() as usize;
        let data = p.data();
        self.for_each_row(dst, |y, row| kernels::divergence_row(row, data, w, y));
        Ok(())
    }

    // =========================================================================
    // Primal-dual updates
    // =========================================================================

    /// `p = (p + σ∇u) / (1 + σα)`, optionally projected.
    fn exec_dual_ascent(&self, p: &mut Field<Float2, Device>, u: &Field<f32, Device>,
                        sigma: f32, alpha: f32, projection: DualProjection) -> ComputeResult<()> {
        p.ensure_same_shape(u)?;
        let (w, h) = (u.width() as usize, u.height() as usize);
        let data = u.data();
        self.for_each_row(p, |y, row| {
            kernels::dual_ascent_row(row, data, w, h, y, sigma, alpha, projection);
        });
        Ok(())
    }

    /// `u = (u + τ(divp + λ_g·λ·g)) / (1 + τ·λ_g·λ)`.
    #[allow(clippy::too_many_arguments)]
    fn exec_primal_descent(&self, u: &mut Field<f32, Device>, divp: &Field<f32, Device>,
                           g: &Field<f32, Device>, lambda: &Field<f32, Device>,
                           tau: f32, lambda_global: f32) -> ComputeResult<()> {
        u.ensure_same_shape(divp)?;
        u.ensure_same_shape(g)?;
        u.ensure_same_shape(lambda)?;
        let w = u.width() as usize;
        let (d, gd, ld) = (divp.data(), g.data(), lambda.data());
        self.for_each_row(u, |y, row| {
            let span = y * w..(y + 1) * w;
            kernels::primal_descent_row(row, &d[span.clone()], &gd[span.clone()], &ld[span],
                                        tau, lambda_global);
        });
        Ok(())
    }

    // =========================================================================
    // Mask editing
    // =========================================================================

    /// Sets every pixel within `radius` of `(cx, cy)` to `value`.
    fn exec_paint_disk(&self, dst: &mut Field<f32, Device>, value: f32,
                       cx: f32, cy: f32, radius: f32) -> ComputeResult<()> {
        self.for_each_row(dst, |y, row| kernels::paint_disk_row(row, y, value, cx, cy, radius));
        Ok(())
    }
}
