//! Transient solvers.

pub mod backward_euler;
mod schedule;

pub use schedule::{Phase, PhaseError};
