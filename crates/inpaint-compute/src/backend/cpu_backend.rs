//! CPU backend using rayon for parallelization.

use rayon::prelude::*;

use inpaint_core::{Device, Element, Field};

use super::{DeviceLimits, KernelPrimitives, kernels};
use crate::{ComputeError, ComputeResult};

/// Row-parallel primitives on the rayon thread pool.
///
/// Runs on the global pool unless built with
/// [`with_threads`](Self::with_threads), which gives the backend its own pool.
pub struct CpuPrimitives {
    limits: DeviceLimits,
    pool: Option<rayon::ThreadPool>,
}

impl CpuPrimitives {
    pub fn new() -> Self {
        Self {
            limits: DeviceLimits::host(),
            pool: None,
        }
    }

    /// Dedicated pool of `threads` workers (0 = rayon default).
    pub fn with_threads(threads: usize) -> ComputeResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("inpaint-cpu-{i}"))
            .build()
            .map_err(|e| ComputeError::ThreadPool(e.to_string()))?;
        Ok(Self {
            limits: DeviceLimits::host(),
            pool: Some(pool),
        })
    }

    /// Replaces the detected limits.
    pub fn with_limits(mut self, limits: DeviceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Worker count used for kernels.
    pub fn threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, |p| p.current_num_threads())
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl Default for CpuPrimitives {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelPrimitives for CpuPrimitives {
    fn for_each_row<T, F>(&self, dst: &mut Field<T, Device>, f: F)
    where
        T: Element,
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        self.install(|| dst.par_rows_mut().for_each(|(y, row)| f(y, row)));
    }

    fn max_abs_diff(&self, a: &Field<f32, Device>, b: &Field<f32, Device>) -> ComputeResult<f32> {
        a.ensure_same_shape(b)?;
        Ok(self.install(|| {
            a.data()
                .par_iter()
                .zip(b.data().par_iter())
                .map(|(x, y)| (x - y).abs())
                .reduce(|| 0.0, kernels::nan_max)
        }))
    }

    fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    fn name(&self) -> &'static str {
        "CPU"
    }
}
