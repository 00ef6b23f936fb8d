//! # inpaint-core
//!
//! Core types for total-variation inpainting.
//!
//! - [`Field`] - dense row-major 2D buffer, typed by element and residency
//! - [`Element`], [`Float2`] - element types stored in fields
//! - [`Residency`], [`Host`], [`Device`] - compile-time memory residency
//! - [`Error`] - field-level errors
//!
//! ## Crate Structure
//!
//! ```text
//! inpaint-core (this crate)
//!    ^
//!    +-- inpaint-compute (backends and kernels)
//!    +-- inpaint-solver  (session driver, config, capture)
//!    +-- inpaint-cli
//! ```

#![warn(missing_docs)]

pub mod element;
pub mod error;
pub mod field;
pub mod residency;

pub use element::{Element, Float2};
pub use error::{Error, Result};
pub use field::{Field, Shape};
pub use residency::{Device, Host, Residency};

/// Prelude module for convenient imports.
///
/// ```
/// use inpaint_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::element::{Element, Float2};
    pub use crate::error::{Error, Result};
    pub use crate::field::{Field, Shape};
    pub use crate::residency::{Device, Host, Residency};
}
