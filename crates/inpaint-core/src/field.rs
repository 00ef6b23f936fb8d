//! Dense 2D field buffers.
//!
//! [`Field<T, R>`] is the one buffer type of the solver: an owned contiguous
//! arena plus width/height/stride metadata, parameterized by
//! - `T: Element` - the element type (`u8`, `f32`, [`Float2`])
//! - `R: Residency` - where the memory lives ([`Host`](crate::Host) or
//!   [`Device`](crate::Device))
//!
//! # Memory Layout
//!
//! Elements are stored **row-major**, top-to-bottom, one element per pixel:
//!
//! ```text
//! [e(0,0) e(1,0) ... e(W-1,0)]  <- row 0
//! [e(0,1) e(1,1) ... e(W-1,1)]  <- row 1
//! ...
//! ```
//!
//! # Ownership
//!
//! A field has exactly one owner. There is no shared aliasing: kernels take
//! `&mut Field` for what they write and `&Field` for what they read, so the
//! borrow checker rules out a kernel reading a buffer another kernel is
//! writing.
//!
//! # Usage
//!
//! ```rust
//! use inpaint_core::prelude::*;
//!
//! let mut lambda: Field<f32, Host> = Field::filled(10, 10, 1.0);
//! lambda.set(5, 5, 0.0);
//! assert_eq!(lambda.at(5, 5), 0.0);
//! assert_eq!(lambda.get(10, 0), None);
//! ```

use crate::{Element, Error, Float2, Residency, Result};
use rayon::prelude::*;
use std::fmt;
use std::marker::PhantomData;

/// Width and height of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Shape {
    /// Creates a shape.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// `true` if either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Owned 2D field with element type `T` and residency `R`.
#[derive(Clone, PartialEq)]
pub struct Field<T: Element, R: Residency> {
    data: Vec<T>,
    width: u32,
    height: u32,
    /// Elements per row.
    stride: usize,
    _residency: PhantomData<R>,
}

impl<T: Element, R: Residency> Field<T, R> {
    /// Creates a field filled with `T::ZERO`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inpaint_core::prelude::*;
    ///
    /// let p: Field<Float2, Device> = Field::new(4, 3);
    /// assert_eq!(p.dimensions(), (4, 3));
    /// assert!(p.data().iter().all(|v| *v == Float2::ZERO));
    /// ```
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, T::ZERO)
    }

    /// Creates a field with every element set to `value`.
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        let len = width as usize * height as usize;
        Self {
            data: vec![value; len],
            width,
            height,
            stride: width as usize,
            _residency: PhantomData,
        }
    }

    /// Creates a field from existing row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `data.len() != width * height`.
    pub fn from_data(width: u32, height: u32, data: Vec<T>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} elements, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            stride: width as usize,
            _residency: PhantomData,
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Shape of this field.
    #[inline]
    pub fn shape(&self) -> Shape {
        Shape::new(self.width, self.height)
    }

    /// Elements per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` if the field has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size of the element storage in bytes.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<T>()
    }

    /// Raw row-major elements.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable raw row-major elements.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the field, returning its storage.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride + x as usize
    }

    /// Element at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn at(&self, x: u32, y: u32) -> T {
        assert!(x < self.width && y < self.height, "element out of bounds");
        self.data[self.offset(x, y)]
    }

    /// Element at `(x, y)`, or `None` outside the field.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<T> {
        if x < self.width && y < self.height {
            Some(self.at(x, y))
        } else {
            None
        }
    }

    /// Sets the element at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        assert!(x < self.width && y < self.height, "element out of bounds");
        let offset = self.offset(x, y);
        self.data[offset] = value;
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Returns row `y`.
    #[inline]
    pub fn row(&self, y: u32) -> &[T] {
        debug_assert!(y < self.height, "row out of bounds");
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize]
    }

    /// Returns row `y` mutably.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [T] {
        debug_assert!(y < self.height, "row out of bounds");
        let start = y as usize * self.stride;
        let end = start + self.width as usize;
        &mut self.data[start..end]
    }

    /// Iterates rows top-to-bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.data.chunks_exact(self.stride.max(1))
    }

    /// Parallel iterator over `(y, row)` pairs.
    pub fn par_rows_mut(&mut self) -> impl IndexedParallelIterator<Item = (usize, &mut [T])> + '_ {
        self.data.par_chunks_mut(self.stride.max(1)).enumerate()
    }

    /// Checks that `other` has the same shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] otherwise.
    #[inline]
    pub fn ensure_same_shape<U: Element, S: Residency>(&self, other: &Field<U, S>) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::dimension_mismatch(self.dimensions(), other.dimensions()));
        }
        Ok(())
    }

    /// Copies all elements of `src` into `self`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the shapes differ.
    pub fn copy_from(&mut self, src: &Self) -> Result<()> {
        self.ensure_same_shape(src)?;
        self.data.copy_from_slice(&src.data);
        Ok(())
    }
}

impl<R: Residency> Field<Float2, R> {
    /// Interleaved `[x, y, x, y, ...]` view of a vector field.
    pub fn as_interleaved(&self) -> &[f32] {
        bytemuck::cast_slice(&self.data)
    }
}

impl<R: Residency> Field<f32, R> {
    /// `(min, max)` over all elements, `None` for an empty field.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

impl<T: Element, R: Residency> fmt::Debug for Field<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("element", &T::NAME)
            .field("residency", &R::NAME)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}
