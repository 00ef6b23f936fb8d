//! Error types for field operations.
//!
//! Covers the failure modes of the field layer:
//! - Buffer construction (length/dimension checks, allocation)
//! - Shape agreement between fields taking part in one operation
//!
//! # Usage
//!
//! ```rust
//! use inpaint_core::{Field, Host, Result};
//!
//! let frame: Result<Field<u8, Host>> = Field::from_data(2, 2, vec![0; 3]);
//! assert!(frame.unwrap_err().is_shape_error());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by [`Field`](crate::Field) construction and access.
///
/// # Categories
///
/// - **Shape errors**: [`DimensionMismatch`](Error::DimensionMismatch), [`InvalidDimensions`](Error::InvalidDimensions)
/// - **Allocation errors**: [`AllocationFailed`](Error::AllocationFailed)
#[derive(Debug, Error)]
pub enum Error {
    /// Memory for a field could not be reserved.
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },

    /// Two fields taking part in one operation have different shapes.
    ///
    /// All session fields share one `W x H` shape for the session lifetime;
    /// this is raised when a caller breaks that contract.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First field width
        a_width: u32,
        /// First field height
        a_height: u32,
        /// Second field width
        b_width: u32,
        /// Second field height
        b_height: u32,
    },

    /// Width/height and data length disagree, or a dimension is zero.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Why the dimensions were rejected
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Returns `true` for shape disagreements and bad dimensions.
    #[inline]
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. } | Self::InvalidDimensions { .. }
        )
    }
}
