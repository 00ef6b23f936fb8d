//! Data-parallel execution backends for TV inpainting.
//!
//! Provides a rayon CPU backend and a single-threaded reference backend for
//! the solver kernels, with automatic backend selection.
//!
//! # Architecture
//!
//! ```text
//! Processor (unified API)
//!     └── AnyPrimitives (enum dispatch)
//!             └── KernelPrimitives trait
//!                     ├── CpuPrimitives    (rayon, row-parallel)
//!                     └── SerialPrimitives (one thread, reference)
//! ```
//!
//! Every kernel is written once as a row function in [`backend::kernels`];
//! a backend only decides how rows are scheduled.
//!
//! # Example
//!
//! ```
//! use inpaint_compute::{Processor, Backend};
//! use inpaint_core::prelude::*;
//!
//! let proc = Processor::new(Backend::Cpu)?;
//! let mut lambda: Field<f32, Device> = proc.allocate(10, 10)?;
//! proc.fill(&mut lambda, 1.0)?;
//! proc.paint_disk(&mut lambda, 0.0, 5.0, 5.0, 2.0)?;
//! assert_eq!(lambda.at(5, 5), 0.0);
//! # Ok::<(), inpaint_compute::ComputeError>(())
//! ```

pub mod backend;
pub mod processor;

pub use backend::{
    AnyPrimitives, Backend, BackendInfo, CpuPrimitives, DeviceLimits, DualProjection,
    KernelPrimitives, SerialPrimitives, describe_backends, detect_backends, select_best_backend,
    GRADIENT_NORM,
};
pub use processor::{Processor, ProcessorBuilder, ProcessorConfig};

use thiserror::Error;

/// Backend and kernel errors.
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Failed to create thread pool: {0}")]
    ThreadPool(String),

    #[error("Buffer too large: {requested} bytes exceeds limit {limit}")]
    BufferTooLarge { requested: u64, limit: u64 },

    #[error("Invalid dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),

    #[error(transparent)]
    Field(#[from] inpaint_core::Error),
}

impl ComputeError {
    /// `true` if two fields in one kernel call had different shapes.
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::Field(inpaint_core::Error::DimensionMismatch { .. }))
    }
}

pub type ComputeResult<T> = Result<T, ComputeError>;
