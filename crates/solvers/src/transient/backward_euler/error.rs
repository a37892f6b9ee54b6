use crate::linear;

/// Errors that can occur during backward Euler integration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("schedule has {phases} phases but {excitations} excitation vectors were given")]
    ExcitationCount { phases: usize, excitations: usize },

    #[error("initial state has {found} entries, but the system has {expected} nodes")]
    InitialState { expected: usize, found: usize },

    #[error("phase {phase}: {source}")]
    Linear {
        phase: usize,
        #[source]
        source: linear::Error,
    },
}

impl Error {
    pub(crate) fn linear(phase: usize) -> impl FnOnce(linear::Error) -> Self {
        move |source| Self::Linear { phase, source }
    }
}
