//! Interactive TV inpainting with a Huber-ROF primal-dual solver.
//!
//! A [`Session`] pulls grayscale frames from a [`FrameSource`], keeps the
//! reconstruction `u`, dual field `p`, divergence and trust mask `λ` on the
//! compute backend, and advances the solver a few iterations per
//! [`tick`](Session::tick). Painting `λ = 0` under the pointer marks pixels
//! as unknown; the solver then fills them from their surroundings.
//!
//! # Example
//!
//! ```
//! use inpaint_solver::{Config, Pattern, PointerState, Session, SyntheticSource};
//!
//! let source = SyntheticSource::new(Pattern::HorizontalRamp, 32, 24)?;
//! let mut session = Session::new(source, Config::default())?;
//!
//! session.set_pointer(PointerState::pressed(16.0, 12.0));
//! let report = session.tick()?;
//! assert!(report.captured);
//! assert_eq!(session.download_trust_mask()?.at(16, 12), 0.0);
//! # Ok::<(), inpaint_solver::SolverError>(())
//! ```

#![warn(missing_docs)]

pub mod capture;
pub mod config;
pub mod energy;
pub mod error;
pub mod input;
pub mod session;

pub use capture::{FrameSource, MemorySource, Pattern, PixelFormat, SyntheticSource};
pub use config::{BrushConfig, Config, DEFAULT_INNER_ITERATIONS, SolverParams};
pub use energy::{Energy, huber, huber_rof_energy};
pub use error::{SolverError, SolverResult};
pub use input::{Command, CommandQueue, PointerState};
pub use session::{Session, SolverState, TickReport};

pub use inpaint_compute::{Backend, DualProjection};
