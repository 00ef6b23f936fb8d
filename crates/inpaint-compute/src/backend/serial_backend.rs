//! Single-threaded reference backend.
//!
//! Runs the same row kernels as the CPU backend in order, on the calling
//! thread. Useful for deterministic debugging and as the baseline the
//! parallel backend is checked against.

use inpaint_core::{Device, Element, Field};

use super::{DeviceLimits, KernelPrimitives, kernels};
use crate::ComputeResult;

/// Sequential primitives.
pub struct SerialPrimitives {
    limits: DeviceLimits,
}

impl SerialPrimitives {
    pub fn new() -> Self {
        Self {
            limits: DeviceLimits::host(),
        }
    }

    /// Replaces the detected limits.
    pub fn with_limits(mut self, limits: DeviceLimits) -> Self {
        self.limits = limits;
        self
    }
}

impl Default for SerialPrimitives {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelPrimitives for SerialPrimitives {
    fn for_each_row<T, F>(&self, dst: &mut Field<T, Device>, f: F)
    where
        T: Element,
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        let stride = dst.stride().max(1);
        for (y, row) in dst.data_mut().chunks_mut(stride).enumerate() {
            f(y, row);
        }
    }

    fn max_abs_diff(&self, a: &Field<f32, Device>, b: &Field<f32, Device>) -> ComputeResult<f32> {
        a.ensure_same_shape(b)?;
        Ok(a.data()
            .iter()
            .zip(b.data())
            .fold(0.0f32, |m, (x, y)| kernels::nan_max(m, (x - y).abs())))
    }

    fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    fn name(&self) -> &'static str {
        "Serial"
    }
}
