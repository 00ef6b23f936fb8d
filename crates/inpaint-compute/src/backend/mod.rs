//! Compute backends for field kernels.
//!
//! Provides a rayon CPU backend and a serial reference backend with
//! automatic selection.
//!
//! # Architecture
//!
//! ```text
//! KernelPrimitives (row scheduler + provided kernels)
//!     +-- CpuPrimitives    (rayon par_chunks_mut over rows)
//!     +-- SerialPrimitives (chunks_mut over rows)
//! ```
//!
//! An accelerator backend plugs in by implementing `for_each_row`,
//! `max_abs_diff` and the transfer methods; the field contracts stay the same.

mod cpu_backend;
mod detect;
pub mod kernels;
mod limits;
mod primitives;
mod serial_backend;

pub use cpu_backend::CpuPrimitives;
pub use detect::{BackendInfo, describe_backends, detect_backends, select_best_backend};
pub use kernels::{DualProjection, GRADIENT_NORM};
pub use limits::DeviceLimits;
pub use primitives::KernelPrimitives;
pub use serial_backend::SerialPrimitives;

use std::fmt;
use std::str::FromStr;

use inpaint_core::{Device, Element, Field};

use crate::{ComputeError, ComputeResult};

/// Available compute backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Backend {
    /// Auto-select best available.
    #[default]
    Auto,
    /// CPU backend using rayon for parallelization.
    Cpu,
    /// Single-threaded reference backend.
    Serial,
}

impl Backend {
    /// Check if this backend is available on current system.
    pub fn is_available(&self) -> bool {
        match self {
            Self::Auto | Self::Cpu | Self::Serial => true,
        }
    }

    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
            Self::Serial => "serial",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" | "rayon" => Ok(Self::Cpu),
            "serial" => Ok(Self::Serial),
            other => Err(ComputeError::BackendNotAvailable(other.to_string())),
        }
    }
}

/// Primitives enum for static dispatch over the generic kernel trait.
pub enum AnyPrimitives {
    Cpu(CpuPrimitives),
    Serial(SerialPrimitives),
}

impl AnyPrimitives {
    /// Create primitives for `backend` (`threads` > 0 gives the CPU backend its own pool).
    pub fn create(backend: Backend, threads: usize) -> ComputeResult<Self> {
        match backend {
            Backend::Auto => Self::create(select_best_backend(), threads),
            Backend::Cpu if threads > 0 => Ok(Self::Cpu(CpuPrimitives::with_threads(threads)?)),
            Backend::Cpu => Ok(Self::Cpu(CpuPrimitives::new())),
            Backend::Serial => Ok(Self::Serial(SerialPrimitives::new())),
        }
    }

    /// Concrete backend kind.
    pub fn backend(&self) -> Backend {
        match self {
            Self::Cpu(_) => Backend::Cpu,
            Self::Serial(_) => Backend::Serial,
        }
    }
}

impl KernelPrimitives for AnyPrimitives {
    fn for_each_row<T, F>(&self, dst: &mut Field<T, Device>, f: F)
    where
        T: Element,
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        match self {
            Self::Cpu(p) => p.for_each_row(dst, f),
            Self::Serial(p) => p.for_each_row(dst, f),
        }
    }

    fn max_abs_diff(&self, a: &Field<f32, Device>, b: &Field<f32, Device>) -> ComputeResult<f32> {
        match self {
            Self::Cpu(p) => p.max_abs_diff(a, b),
            Self::Serial(p) => p.max_abs_diff(a, b),
        }
    }

    fn limits(&self) -> &DeviceLimits {
        match self {
            Self::Cpu(p) => p.limits(),
            Self::Serial(p) => p.limits(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Cpu(p) => p.name(),
            Self::Serial(p) => p.name(),
        }
    }
}
