use super::Snapshot;

/// Indicates how the solver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Completed every phase of the schedule.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The result of a backward Euler integration.
#[derive(Debug, Clone)]
pub struct Solution {
    /// How the solver terminated.
    pub status: Status,

    /// One snapshot per completed substep, in chronological order.
    pub history: Vec<Snapshot>,

    /// Number of substeps completed.
    pub steps: usize,
}

impl Solution {
    /// Returns the last computed snapshot, if any step ran.
    #[must_use]
    pub fn last(&self) -> Option<&Snapshot> {
        self.history.last()
    }
}
