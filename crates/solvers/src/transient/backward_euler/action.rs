/// Control actions supported by the backward Euler solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop after the current substep and return the history so far.
    StopEarly,
}
