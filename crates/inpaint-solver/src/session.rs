//! Interactive inpainting session.
//!
//! Owns every field, the capture source and the compute processor, and
//! advances the primal-dual solver one tick at a time:
//!
//! 1. drain queued [`Command`]s;
//! 2. capture a frame if this is the first tick, the session is running or a
//!    step was requested, and reset all fields from it;
//! 3. under the same condition run the configured number of inner
//!    iterations of {dual ascent; divergence; primal descent};
//! 4. paint the trust mask under the active pointer.
//!
//! Fields are only reachable through `&self` accessors, so nothing can
//! observe them mid-iteration.

use std::fmt;

use inpaint_compute::{Processor, ProcessorBuilder};
use inpaint_core::{Device, Field, Float2, Host};
use tracing::{debug, info, trace};

use crate::capture::{FrameSource, PixelFormat};
use crate::config::Config;
use crate::energy::{Energy, huber_rof_energy};
use crate::error::{SolverError, SolverResult};
use crate::input::{Command, CommandQueue, PointerState};

/// Frame bytes to `[0, 1]`.
const FRAME_SCALE: f32 = 1.0 / 255.0;

/// Driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// Built, no tick yet.
    Idle,
    /// Capturing and iterating every tick.
    Running,
    /// Iterating only on [`Command::Step`].
    Paused,
    /// Fields being rebuilt from a new frame.
    FrameReset,
}

impl fmt::Display for SolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::FrameReset => "frame-reset",
        })
    }
}

/// Outcome of one [`Session::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Zero-based tick index.
    pub frame: u64,
    /// State after the tick.
    pub state: SolverState,
    /// A new frame was captured and the fields were reset.
    pub captured: bool,
    /// Inner iterations executed.
    pub iterations: usize,
    /// Last `max |u_k - u_{k-1}|`, only tracked with a tolerance set.
    pub residual: Option<f32>,
}

/// Interactive Huber-ROF inpainting session over a frame source.
pub struct Session<S: FrameSource> {
    processor: Processor,
    source: S,
    config: Config,
    state: SolverState,
    running: bool,
    ticks: u64,
    commands: CommandQueue,
    pointer: PointerState,

    host_frame: Field<u8, Host>,
    raw: Field<u8, Device>,
    g: Field<f32, Device>,
    u: Field<f32, Device>,
    u_prev: Field<f32, Device>,
    p: Field<Float2, Device>,
    divp: Field<f32, Device>,
    lambda: Field<f32, Device>,
}

impl<S: FrameSource> Session<S> {
    /// Validates `config` and `source` and allocates all fields.
    ///
    /// # Errors
    ///
    /// - [`SolverError::InvalidParameter`] for a bad configuration
    /// - [`SolverError::UnsupportedFormat`] unless the source is GRAY8
    /// - backend creation or allocation failures
    pub fn new(source: S, config: Config) -> SolverResult<Self> {
        config.validate()?;
        let processor = ProcessorBuilder::new()
            .backend(config.backend)
            .threads(config.threads)
            .build()?;
        Self::with_processor(source, config, processor)
    }

    /// Like [`new`](Self::new) with an already built processor.
    pub fn with_processor(source: S, config: Config, processor: Processor) -> SolverResult<Self> {
        config.validate()?;
        let format = source.format();
        if format != PixelFormat::Gray8 {
            return Err(SolverError::UnsupportedFormat {
                format: format.to_string(),
            });
        }
        let (w, h) = source.dimensions();

        let mut lambda = processor.allocate(w, h)?;
        processor.fill(&mut lambda, 1.0f32)?;

        info!(
            width = w,
            height = h,
            backend = processor.backend_name(),
            running = config.start_running,
            "inpainting session ready"
        );

        Ok(Self {
            host_frame: Field::new(w, h),
            raw: processor.allocate(w, h)?,
            g: processor.allocate(w, h)?,
            u: processor.allocate(w, h)?,
            u_prev: processor.allocate(w, h)?,
            p: processor.allocate(w, h)?,
            divp: processor.allocate(w, h)?,
            lambda,
            running: config.start_running,
            processor,
            source,
            config,
            state: SolverState::Idle,
            ticks: 0,
            commands: CommandQueue::new(),
            pointer: PointerState::default(),
        })
    }

    // === Input ===

    /// Queues a command for the next tick.
    pub fn push_command(&mut self, cmd: Command) {
        self.commands.push(cmd);
    }

    /// Pending commands.
    pub fn commands_mut(&mut self) -> &mut CommandQueue {
        &mut self.commands
    }

    /// Updates the pointer used for mask painting.
    pub fn set_pointer(&mut self, pointer: PointerState) {
        self.pointer = pointer;
    }

    /// Current pointer.
    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    // === Driver ===

    /// Advances the session by one tick.
    pub fn tick(&mut self) -> SolverResult<TickReport> {
        let frame = self.ticks;
        let first = self.state == SolverState::Idle;

        let mut step = false;
        let pending: Vec<Command> = self.commands.drain().collect();
        for cmd in pending {
            match cmd {
                Command::ToggleRun => self.toggle_run(),
                Command::Step => step = true,
            }
        }

        let go = first || self.running || step;
        let captured = go && self.capture()?;
        if first && !captured {
            self.set_state(self.mode());
        }

        let (iterations, residual) = if go { self.iterate()? } else { (0, None) };

        if self.pointer.active {
            self.paint(self.pointer.x, self.pointer.y)?;
        }

        self.ticks += 1;
        let report = TickReport {
            frame,
            state: self.state,
            captured,
            iterations,
            residual,
        };
        debug!(
            frame,
            state = %report.state,
            captured,
            iterations,
            residual = ?residual,
            "tick"
        );
        Ok(report)
    }

    fn mode(&self) -> SolverState {
        if self.running {
            SolverState::Running
        } else {
            SolverState::Paused
        }
    }

    fn set_state(&mut self, state: SolverState) {
        if self.state != state {
            info!(from = %self.state, to = %state, "solver state");
            self.state = state;
        }
    }

    fn toggle_run(&mut self) {
        self.running = !self.running;
        if self.state != SolverState::Idle {
            self.set_state(self.mode());
        } else {
            debug!(running = self.running, "start mode toggled");
        }
    }

    /// Grabs a frame and resets the fields from it. `false` if none was ready.
    fn capture(&mut self) -> SolverResult<bool> {
        if !self.source.grab_next(&mut self.host_frame)? {
            trace!("no new frame");
            return Ok(false);
        }
        self.set_state(SolverState::FrameReset);
        self.reset_fields()?;
        self.set_state(self.mode());
        Ok(true)
    }

    fn reset_fields(&mut self) -> SolverResult<()> {
        let proc = &self.processor;
        proc.upload(&self.host_frame, &mut self.raw)?;
        proc.normalize(&mut self.g, &self.raw, FRAME_SCALE, 0.0)?;
        proc.copy(&mut self.u, &self.g)?;
        proc.fill(&mut self.p, Float2::new(0.0, 0.0))?;
        proc.fill(&mut self.divp, 0.0f32)?;
        proc.fill(&mut self.lambda, 1.0f32)?;
        Ok(())
    }

    fn iterate(&mut self) -> SolverResult<(usize, Option<f32>)> {
        let params = self.config.solver;
        let projection = self.config.dual_projection;
        let tolerance = self.config.tolerance;
        let proc = &self.processor;

        let mut residual = None;
        for k in 0..self.config.inner_iterations {
            if tolerance.is_some() {
                proc.copy(&mut self.u_prev, &self.u)?;
            }
            trace!(iteration = k, "primal-dual step");
            proc.dual_ascent(&mut self.p, &self.u, params.sigma, params.alpha, projection)?;
            proc.divergence(&mut self.divp, &self.p)?;
            proc.primal_descent(&mut self.u, &self.divp, &self.g, &self.lambda,
                                params.tau, params.lambda)?;

            if let Some(tol) = tolerance {
                let r = proc.max_abs_diff(&self.u, &self.u_prev)?;
                residual = Some(r);
                if r < tol {
                    return Ok((k + 1, residual));
                }
            }
        }
        Ok((self.config.inner_iterations, residual))
    }

    // === Mask editing ===

    /// Paints the configured brush at `(x, y)`.
    pub fn paint(&mut self, x: f32, y: f32) -> SolverResult<()> {
        let brush = self.config.brush;
        self.paint_disk(x, y, brush.radius, brush.value)
    }

    /// Sets the trust mask to `value` inside the closed disk.
    pub fn paint_disk(&mut self, cx: f32, cy: f32, radius: f32, value: f32) -> SolverResult<()> {
        trace!(cx, cy, radius, value, "paint disk");
        self.processor.paint_disk(&mut self.lambda, value, cx, cy, radius)?;
        Ok(())
    }

    // === Read-only outputs ===

    /// Normalized captured frame `g`.
    pub fn reference(&self) -> &Field<f32, Device> {
        &self.g
    }

    /// Current reconstruction `u`.
    pub fn reconstruction(&self) -> &Field<f32, Device> {
        &self.u
    }

    /// Divergence of the dual field from the last iteration.
    pub fn divergence(&self) -> &Field<f32, Device> {
        &self.divp
    }

    /// Per-pixel data weight `λ`.
    pub fn trust_mask(&self) -> &Field<f32, Device> {
        &self.lambda
    }

    /// Dual field `p`.
    pub fn dual(&self) -> &Field<Float2, Device> {
        &self.p
    }

    /// Copies `u` to the host.
    pub fn download_reconstruction(&self) -> SolverResult<Field<f32, Host>> {
        Ok(self.processor.download_new(&self.u)?)
    }

    /// Copies `div p` to the host.
    pub fn download_divergence(&self) -> SolverResult<Field<f32, Host>> {
        Ok(self.processor.download_new(&self.divp)?)
    }

    /// Copies `λ` to the host.
    pub fn download_trust_mask(&self) -> SolverResult<Field<f32, Host>> {
        Ok(self.processor.download_new(&self.lambda)?)
    }

    /// Huber-ROF energy of the current reconstruction.
    pub fn energy(&self) -> SolverResult<Energy> {
        huber_rof_energy(&self.u, &self.g, &self.lambda, &self.config.solver)
    }

    // === Status ===

    /// Current state.
    pub fn state(&self) -> SolverState {
        self.state
    }

    /// Continuous run mode (also before the first tick).
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks completed.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Field size `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.u.dimensions()
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compute processor.
    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    /// Capture source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: FrameSource> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("dimensions", &self.dimensions())
            .field("state", &self.state)
            .field("running", &self.running)
            .field("ticks", &self.ticks)
            .field("backend", &self.processor.backend_name())
            .finish()
    }
}
