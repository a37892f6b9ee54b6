//! Capability traits for cross-solver observers.
//!
//! These traits abstract over solver-specific event and action types, enabling
//! observers to work generically across different solvers.
//!
//! # Event traits
//!
//! - [`HasProgress`] — events that know how far through a run they are
//! - [`HasTemperatures`] — events that carry node temperatures
//!
//! # Action traits
//!
//! - [`CanStopEarly`] — actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use ctm_core::Observer;
//! use ctm_observers::traits::{CanStopEarly, HasProgress};
//!
//! struct StopHalfway;
//!
//! impl<E: HasProgress, A: CanStopEarly> Observer<E, A> for StopHalfway {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (2 * event.step() >= event.total_steps()).then(A::stop_early)
//!     }
//! }
//! ```

use ctm_solvers::transient::backward_euler;

/// An event that reports how far through a run it is.
pub trait HasProgress {
    /// Returns the number of completed steps, counting from 1.
    fn step(&self) -> usize;

    /// Returns the number of steps in the whole run.
    fn total_steps(&self) -> usize;

    /// Returns the simulated time reached, in seconds.
    fn time(&self) -> f64;
}

/// An event that carries node temperatures.
pub trait HasTemperatures {
    /// Returns the temperature rise of every node above ambient.
    fn temperatures(&self) -> &[f64];
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

// --- backward_euler ---

impl HasProgress for backward_euler::Event {
    fn step(&self) -> usize {
        self.step
    }

    fn total_steps(&self) -> usize {
        self.total_steps
    }

    fn time(&self) -> f64 {
        self.snapshot.time
    }
}

impl HasTemperatures for backward_euler::Event {
    fn temperatures(&self) -> &[f64] {
        self.snapshot.temperatures.as_slice()
    }
}

impl CanStopEarly for backward_euler::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
