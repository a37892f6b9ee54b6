use nalgebra::DVector;

/// Node temperatures at the end of one substep.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Index of the phase this substep belongs to.
    pub phase: usize,

    /// Index of the substep within its phase.
    pub substep: usize,

    /// Simulated time at the end of the substep, in seconds.
    pub time: f64,

    /// Temperature rise of every node above ambient.
    pub temperatures: DVector<f64>,
}

/// Event emitted by the backward Euler solver after each substep.
///
/// Steps are numbered from 1 across the whole schedule.
#[derive(Debug, Clone)]
pub struct Event {
    /// Global step number.
    pub step: usize,

    /// Total number of steps in the schedule.
    pub total_steps: usize,

    /// The state reached by this step.
    pub snapshot: Snapshot,
}
