//! Frame capture sources.
//!
//! A session pulls at most one frame per tick through [`FrameSource`]. A
//! source that has nothing new reports `Ok(false)`; the session then keeps
//! iterating on the fields it already has.

use std::fmt;

use inpaint_core::{Field, Host};

use crate::error::{SolverError, SolverResult};

/// Pixel layout reported by a capture source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelFormat {
    /// Single-channel 8-bit grayscale.
    Gray8,
    /// Interleaved 8-bit RGB.
    Rgb8,
    /// Anything else, by name.
    Other(String),
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gray8 => f.write_str("GRAY8"),
            Self::Rgb8 => f.write_str("RGB8"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Source of fixed-size grayscale frames.
pub trait FrameSource {
    /// Pixel format of delivered frames.
    fn format(&self) -> PixelFormat;

    /// Frame size `(width, height)`; constant for the life of the source.
    fn dimensions(&self) -> (u32, u32);

    /// Writes the next frame into `frame`.
    ///
    /// Returns `Ok(false)` when no new frame is ready; `frame` is then left
    /// untouched.
    fn grab_next(&mut self, frame: &mut Field<u8, Host>) -> SolverResult<bool>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn format(&self) -> PixelFormat {
        (**self).format()
    }

    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn grab_next(&mut self, frame: &mut Field<u8, Host>) -> SolverResult<bool> {
        (**self).grab_next(frame)
    }
}

fn check_frame_shape(frame: &Field<u8, Host>, dims: (u32, u32)) -> SolverResult<()> {
    if frame.dimensions() != dims {
        return Err(inpaint_core::Error::dimension_mismatch(frame.dimensions(), dims).into());
    }
    Ok(())
}

// ============================================================================
// MemorySource
// ============================================================================

/// Pre-recorded frames, served one per grab.
///
/// After the last frame the source reports "no new frame", or starts over
/// when looping is enabled.
#[derive(Debug, Clone)]
pub struct MemorySource {
    frames: Vec<Vec<u8>>,
    width: u32,
    height: u32,
    format: PixelFormat,
    next: usize,
    looping: bool,
}

impl MemorySource {
    /// Creates a source from row-major `width * height` frames.
    pub fn new(width: u32, height: u32, frames: Vec<Vec<u8>>) -> SolverResult<Self> {
        if width == 0 || height == 0 {
            return Err(inpaint_core::Error::invalid_dimensions(width, height, "empty frame").into());
        }
        let len = width as usize * height as usize;
        if let Some(i) = frames.iter().position(|f| f.len() != len) {
            return Err(SolverError::Capture(format!(
                "frame {i} has {} bytes, expected {len}",
                frames[i].len()
            )));
        }
        Ok(Self {
            frames,
            width,
            height,
            format: PixelFormat::Gray8,
            next: 0,
            looping: false,
        })
    }

    /// Creates a source from host fields of equal shape.
    pub fn from_fields(fields: Vec<Field<u8, Host>>) -> SolverResult<Self> {
        let (width, height) = fields
            .first()
            .map(|f| f.dimensions())
            .ok_or_else(|| SolverError::Capture("no frames".into()))?;
        for f in &fields {
            check_frame_shape(f, (width, height))?;
        }
        Self::new(width, height, fields.into_iter().map(Field::into_data).collect())
    }

    /// Restart from the first frame after the last one.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Overrides the reported pixel format.
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    /// Frames not yet served in the current pass.
    pub fn remaining(&self) -> usize {
        self.frames.len() - self.next
    }
}

impl FrameSource for MemorySource {
    fn format(&self) -> PixelFormat {
        self.format.clone()
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab_next(&mut self, frame: &mut Field<u8, Host>) -> SolverResult<bool> {
        check_frame_shape(frame, (self.width, self.height))?;
        if self.next >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return Ok(false);
            }
            self.next = 0;
        }
        frame.data_mut().copy_from_slice(&self.frames[self.next]);
        self.next += 1;
        Ok(true)
    }
}

// ============================================================================
// SyntheticSource
// ============================================================================

/// Generated test pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Uniform level.
    Constant(u8),
    /// Black to white, left to right.
    HorizontalRamp,
    /// Checkerboard with square cells of the given size.
    Checker(u32),
    /// Bright disc on a dark background.
    Disc,
}

impl Pattern {
    fn sample(&self, x: u32, y: u32, width: u32, height: u32) -> u8 {
        match *self {
            Self::Constant(level) => level,
            Self::HorizontalRamp => {
                let span = width.saturating_sub(1).max(1);
                ((x.min(span) as u64 * 255) / span as u64) as u8
            }
            Self::Checker(cell) => {
                let cell = cell.max(1);
                if (x / cell + y / cell) % 2 == 0 { 64 } else { 192 }
            }
            Self::Disc => {
                let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
                let r = width.min(height) as f32 / 4.0;
                let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
                if dx * dx + dy * dy <= r * r { 224 } else { 32 }
            }
        }
    }
}

/// Endless source rendering a [`Pattern`] on every grab.
///
/// With a non-zero drift the pattern moves right by `drift` pixels per
/// frame (wrapping), which makes continuous capture visible.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    pattern: Pattern,
    width: u32,
    height: u32,
    drift: u32,
    frame: u64,
}

impl SyntheticSource {
    /// Creates a static pattern source.
    pub fn new(pattern: Pattern, width: u32, height: u32) -> SolverResult<Self> {
        if width == 0 || height == 0 {
            return Err(inpaint_core::Error::invalid_dimensions(width, height, "empty frame").into());
        }
        Ok(Self {
            pattern,
            width,
            height,
            drift: 0,
            frame: 0,
        })
    }

    /// Horizontal shift per frame in pixels.
    pub fn with_drift(mut self, drift: u32) -> Self {
        self.drift = drift;
        self
    }

    /// Frames produced so far.
    pub fn frames_served(&self) -> u64 {
        self.frame
    }
}

impl FrameSource for SyntheticSource {
    fn format(&self) -> PixelFormat {
        PixelFormat::Gray8
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab_next(&mut self, frame: &mut Field<u8, Host>) -> SolverResult<bool> {
        check_frame_shape(frame, (self.width, self.height))?;
        let shift = ((self.frame * self.drift as u64) % self.width as u64) as u32;
        let (w, h) = (self.width, self.height);
        for y in 0..h {
            for (x, v) in frame.row_mut(y).iter_mut().enumerate() {
                let sx = (x as u32 + w - shift) % w;
                *v = self.pattern.sample(sx, y, w, h);
            }
        }
        self.frame += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_sequence() {
        let mut src = MemorySource::new(2, 1, vec![vec![1, 2], vec![3, 4]]).unwrap();
        let mut frame = Field::new(2, 1);
        assert!(src.grab_next(&mut frame).unwrap());
        assert_eq!(frame.data(), &[1, 2]);
        assert!(src.grab_next(&mut frame).unwrap());
        assert_eq!(frame.data(), &[3, 4]);
        assert_eq!(src.remaining(), 0);

        // exhausted: frame untouched
        assert!(!src.grab_next(&mut frame).unwrap());
        assert_eq!(frame.data(), &[3, 4]);
    }

    #[test]
    fn test_memory_source_looping() {
        let mut src = MemorySource::new(1, 1, vec![vec![7], vec![9]])
            .unwrap()
            .with_looping(true);
        let mut frame = Field::new(1, 1);
        let seen: Vec<u8> = (0..5)
            .map(|_| {
                assert!(src.grab_next(&mut frame).unwrap());
                frame.at(0, 0)
            })
            .collect();
        assert_eq!(seen, vec![7, 9, 7, 9, 7]);
    }

    #[test]
    fn test_memory_source_rejects_bad_frames() {
        assert!(MemorySource::new(2, 2, vec![vec![0; 3]]).is_err());
        assert!(MemorySource::new(0, 2, vec![]).is_err());
        assert!(MemorySource::from_fields(vec![]).is_err());

        let mut src = MemorySource::new(2, 2, vec![vec![0; 4]]).unwrap();
        let mut wrong = Field::new(3, 2);
        assert!(src.grab_next(&mut wrong).is_err());
    }

    #[test]
    fn test_ramp_pattern() {
        let mut src = SyntheticSource::new(Pattern::HorizontalRamp, 5, 2).unwrap();
        let mut frame = Field::new(5, 2);
        assert!(src.grab_next(&mut frame).unwrap());
        assert_eq!(frame.row(0), &[0, 63, 127, 191, 255]);
        assert_eq!(frame.row(0), frame.row(1));
    }

    #[test]
    fn test_checker_and_drift() {
        let mut src = SyntheticSource::new(Pattern::Checker(1), 4, 1).unwrap().with_drift(1);
        let mut frame = Field::new(4, 1);
        src.grab_next(&mut frame).unwrap();
        assert_eq!(frame.data(), &[64, 192, 64, 192]);
        src.grab_next(&mut frame).unwrap();
        assert_eq!(frame.data(), &[192, 64, 192, 64]);
        assert_eq!(src.frames_served(), 2);
    }

    #[test]
    fn test_disc_pattern() {
        let mut src = SyntheticSource::new(Pattern::Disc, 16, 16).unwrap();
        let mut frame = Field::new(16, 16);
        src.grab_next(&mut frame).unwrap();
        assert_eq!(frame.at(8, 8), 224);
        assert_eq!(frame.at(0, 0), 32);
    }

    #[test]
    fn test_format_display() {
        assert_eq!(PixelFormat::Gray8.to_string(), "GRAY8");
        assert_eq!(PixelFormat::Rgb8.to_string(), "RGB8");
        assert_eq!(PixelFormat::Other("YUYV".into()).to_string(), "YUYV");
    }
}
