//! Element types stored in fields.
//!
//! - `u8` - raw grayscale frame samples
//! - `f32` - scalar fields (`g`, `u`, `divp`, `λ`)
//! - [`Float2`] - two-component vectors (`p`, gradients)
//!
//! # Memory Layout
//!
//! [`Float2`] is `#[repr(C)]` and [`bytemuck::Pod`], so a vector field can be
//! viewed as an interleaved `[x0, y0, x1, y1, ...]` float slice without
//! copying, which is what an external viewer or upload path expects.

use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// Trait for types that can be stored in a [`Field`](crate::Field).
pub trait Element: Copy + Clone + Default + Send + Sync + PartialEq + fmt::Debug + 'static {
    /// Additive identity, used for zero-initialized fields.
    const ZERO: Self;

    /// Human-readable name for diagnostics.
    const NAME: &'static str;
}

impl Element for u8 {
    const ZERO: Self = 0;
    const NAME: &'static str = "u8";
}

impl Element for f32 {
    const ZERO: Self = 0.0;
    const NAME: &'static str = "f32";
}

impl Element for Float2 {
    const ZERO: Self = Float2 { x: 0.0, y: 0.0 };
    const NAME: &'static str = "float2";
}

/// Two-component float vector, one per pixel of a vector field.
#[repr(C)]
#[derive(Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Float2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Float2 {
    /// Creates a vector from its components.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Both components finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Debug for Float2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Float2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Float2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Float2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Float2 {
    type Output = Self;
    #[inline]
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_float2_ops() {
        let a = Float2::new(3.0, 4.0);
        assert_relative_eq!(a.length(), 5.0);
        assert_eq!(a + Float2::new(1.0, 1.0), Float2::new(4.0, 5.0));
        assert_eq!((a * 2.0) / 2.0, a);
        assert_relative_eq!(a.dot(Float2::new(1.0, 0.0)), 3.0);
    }

    #[test]
    fn test_pod_layout() {
        let v = [Float2::new(1.0, 2.0), Float2::new(3.0, 4.0)];
        let flat: &[f32] = bytemuck::cast_slice(&v);
        assert_eq!(flat, &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_zero() {
        assert_eq!(<f32 as Element>::ZERO, 0.0);
        assert_eq!(Float2::ZERO, Float2::default());
    }
}
