//! Memory residency markers for fields.
//!
//! A field lives either in host memory (where frames arrive and where an
//! external viewer reads results) or in accelerator memory (where kernels
//! run). Residency is a zero-sized marker type parameter on
//! [`Field`](crate::Field), so a host buffer can never be handed to a kernel
//! by accident:
//!
//! ```compile_fail
//! use inpaint_core::prelude::*;
//!
//! fn kernel(_f: &mut Field<f32, Device>) {}
//!
//! let mut host: Field<f32, Host> = Field::new(4, 4);
//! kernel(&mut host); // Compile error: Host is not Device
//! ```
//!
//! Moving data across the boundary is an explicit, blocking backend call
//! (`upload` / `download` in `inpaint-compute`).

use std::fmt;

/// Trait for residency marker types.
pub trait Residency: Copy + Clone + Default + Send + Sync + fmt::Debug + 'static {
    /// Human-readable name.
    const NAME: &'static str;
}

/// Host memory: captured frames and viewer copies.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Host;

impl Residency for Host {
    const NAME: &'static str = "host";
}

/// Accelerator memory: every field a kernel reads or writes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Device;

impl Residency for Device {
    const NAME: &'static str = "device";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(Host::NAME, "host");
        assert_eq!(Device::NAME, "device");
    }
}
