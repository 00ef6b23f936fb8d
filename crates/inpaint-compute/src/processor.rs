//! Unified compute processor for the solver kernels.
//!
//! # Configuration
//!
//! Use [`ProcessorBuilder`] for control over backend and threading:
//!
//! ```
//! use inpaint_compute::{ProcessorBuilder, Backend};
//!
//! let proc = ProcessorBuilder::new()
//!     .backend(Backend::Cpu)
//!     .threads(2)
//!     .build()?;
//! assert_eq!(proc.backend_name(), "CPU");
//! # Ok::<(), inpaint_compute::ComputeError>(())
//! ```

use inpaint_core::{Device, Element, Field, Float2, Host};
use tracing::debug;

use crate::backend::{AnyPrimitives, Backend, DeviceLimits, DualProjection, KernelPrimitives};
use crate::ComputeResult;

// ============================================================================
// Configuration
// ============================================================================

/// Processing configuration.
#[derive(Debug, Clone, Default)]
pub struct ProcessorConfig {
    /// Worker threads for the CPU backend (0 = rayon global pool).
    pub threads: usize,
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Processor`].
#[derive(Debug, Clone, Default)]
pub struct ProcessorBuilder {
    backend: Backend,
    config: ProcessorConfig,
}

impl ProcessorBuilder {
    /// Create new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compute backend.
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set worker thread count (0 = shared global pool).
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    /// Build the processor.
    pub fn build(self) -> ComputeResult<Processor> {
        let primitives = AnyPrimitives::create(self.backend, self.config.threads)?;
        debug!(
            requested = %self.backend,
            selected = primitives.name(),
            threads = self.config.threads,
            "compute backend ready"
        );
        Ok(Processor {
            primitives,
            config: self.config,
        })
    }
}

// ============================================================================
// Processor
// ============================================================================

/// Unified entry point for every field operation the solver needs.
///
/// Owns the backend; fields stay owned by the caller and are passed by
/// reference, `&mut` for the one being written.
pub struct Processor {
    primitives: AnyPrimitives,
    config: ProcessorConfig,
}

impl Processor {
    /// Create processor with the given backend.
    pub fn new(backend: Backend) -> ComputeResult<Self> {
        ProcessorBuilder::new().backend(backend).build()
    }

    /// Create processor with the best available backend.
    pub fn auto() -> ComputeResult<Self> {
        Self::new(Backend::Auto)
    }

    /// Start a builder.
    pub fn builder() -> ProcessorBuilder {
        ProcessorBuilder::new()
    }

    /// Name of the backend that runs the kernels.
    pub fn backend_name(&self) -> &'static str {
        self.primitives.name()
    }

    /// Concrete backend kind.
    pub fn backend(&self) -> Backend {
        self.primitives.backend()
    }

    /// Backend limits.
    pub fn limits(&self) -> &DeviceLimits {
        self.primitives.limits()
    }

    /// Active configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    // === Buffers ===

    /// Allocate a zero-filled device field.
    pub fn allocate<T: Element>(&self, width: u32, height: u32) -> ComputeResult<Field<T, Device>> {
        self.primitives.allocate(width, height)
    }

    /// Blocking host to device copy.
    pub fn upload<T: Element>(&self, src: &Field<T, Host>, dst: &mut Field<T, Device>) -> ComputeResult<()> {
        self.primitives.upload(src, dst)
    }

    /// Blocking device to host copy.
    pub fn download<T: Element>(&self, src: &Field<T, Device>, dst: &mut Field<T, Host>) -> ComputeResult<()> {
        self.primitives.download(src, dst)
    }

    /// Download into a freshly allocated host field.
    pub fn download_new<T: Element>(&self, src: &Field<T, Device>) -> ComputeResult<Field<T, Host>> {
        let mut host = Field::new(src.width(), src.height());
        self.primitives.download(src, &mut host)?;
        Ok(host)
    }

    // === Elementwise ===

    /// `dst = src * scale + bias`; with `scale = 1/255` maps frames to [0, 1].
    pub fn normalize(&self, dst: &mut Field<f32, Device>, src: &Field<u8, Device>,
                     scale: f32, bias: f32) -> ComputeResult<()> {
        self.primitives.exec_scale_bias(dst, src, scale, bias)
    }

    /// Set every element to `value`.
    pub fn fill<T: Element>(&self, dst: &mut Field<T, Device>, value: T) -> ComputeResult<()> {
        self.primitives.exec_fill(dst, value)
    }

    /// Copy `src` into `dst`.
    pub fn copy<T: Element>(&self, dst: &mut Field<T, Device>, src: &Field<T, Device>) -> ComputeResult<()> {
        self.primitives.exec_copy(dst, src)
    }

    // === Differential operators ===

    /// Forward-difference gradient.
    pub fn gradient(&self, dst: &mut Field<Float2, Device>, u: &Field<f32, Device>) -> ComputeResult<()> {
        self.primitives.exec_gradient(dst, u)
    }

    /// Backward-difference divergence.
    pub fn divergence(&self, dst: &mut Field<f32, Device>, p: &Field<Float2, Device>) -> ComputeResult<()> {
        self.primitives.exec_divergence(dst, p)
    }

    // === Primal-dual ===

    /// Huber dual ascent on `p`.
    pub fn dual_ascent(&self, p: &mut Field<Float2, Device>, u: &Field<f32, Device>,
                       sigma: f32, alpha: f32, projection: DualProjection) -> ComputeResult<()> {
        self.primitives.exec_dual_ascent(p, u, sigma, alpha, projection)
    }

    /// Weighted L2 primal descent on `u`.
    pub fn primal_descent(&self, u: &mut Field<f32, Device>, divp: &Field<f32, Device>,
                          g: &Field<f32, Device>, lambda: &Field<f32, Device>,
                          tau: f32, lambda_global: f32) -> ComputeResult<()> {
        self.primitives.exec_primal_descent(u, divp, g, lambda, tau, lambda_global)
    }

    // === Mask ===

    /// Paint a closed disk of `value` into `dst`.
    pub fn paint_disk(&self, dst: &mut Field<f32, Device>, value: f32,
                      cx: f32, cy: f32, radius: f32) -> ComputeResult<()> {
        self.primitives.exec_paint_disk(dst, value, cx, cy, radius)
    }

    // === Reductions ===

    /// `max |a - b|`.
    pub fn max_abs_diff(&self, a: &Field<f32, Device>, b: &Field<f32, Device>) -> ComputeResult<f32> {
        self.primitives.max_abs_diff(a, b)
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("backend", &self.backend_name())
            .field("threads", &self.config.threads)
            .finish()
    }
}
