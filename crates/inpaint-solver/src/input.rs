//! User input: run/step commands and the mask pointer.

use std::collections::VecDeque;

/// Discrete user command, applied at the start of the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Switch between continuous running and paused.
    ToggleRun,
    /// Capture (if available) and iterate once, even while paused.
    Step,
}

/// FIFO of pending commands.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: VecDeque<Command>,
}

impl CommandQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a command.
    pub fn push(&mut self, cmd: Command) {
        self.pending.push_back(cmd);
    }

    /// Removes and returns all pending commands in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = Command> + '_ {
        self.pending.drain(..)
    }

    /// Number of pending commands.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Extend<Command> for CommandQueue {
    fn extend<I: IntoIterator<Item = Command>>(&mut self, iter: I) {
        self.pending.extend(iter);
    }
}

/// Pointer position in field pixels plus the "selection active" signal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
    /// Paint while `true`.
    pub active: bool,
}

impl PointerState {
    /// Active pointer at `(x, y)`.
    pub fn pressed(x: f32, y: f32) -> Self {
        Self { x, y, active: true }
    }

    /// Inactive pointer.
    pub fn released() -> Self {
        Self::default()
    }
}
