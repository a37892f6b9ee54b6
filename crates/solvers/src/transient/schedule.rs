use thiserror::Error;

/// One entry of a transient schedule: a duration split into equal substeps.
///
/// Every phase has its own excitation, so power can change between phases
/// while the step size stays constant within one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    duration: f64,
    steps: usize,
}

/// Errors that can occur when validating a phase.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum PhaseError {
    #[error("duration must be finite and positive, got {0}")]
    Duration(f64),

    #[error("a phase needs at least one step")]
    Steps,
}

impl Phase {
    /// Creates a phase of `duration` seconds split into `steps` substeps.
    ///
    /// # Errors
    ///
    /// Returns an error if the duration is not finite and positive, or if
    /// `steps` is zero.
    pub fn new(duration: f64, steps: usize) -> Result<Self, PhaseError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(PhaseError::Duration(duration));
        }
        if steps == 0 {
            return Err(PhaseError::Steps);
        }
        Ok(Self { duration, steps })
    }

    /// Returns the phase duration, in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Returns the number of substeps.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Returns the substep size `duration / steps`, in seconds.
    #[must_use]
    pub fn step_size(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let steps = self.steps as f64;
        self.duration / steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn step_size_divides_duration() {
        let phase = Phase::new(0.5, 4).unwrap();
        assert_relative_eq!(phase.step_size(), 0.125);
        assert_eq!(phase.steps(), 4);
    }

    #[test]
    fn rejects_bad_phases() {
        assert_eq!(Phase::new(0.0, 1), Err(PhaseError::Duration(0.0)));
        assert_eq!(Phase::new(-1.0, 1), Err(PhaseError::Duration(-1.0)));
        assert!(matches!(
            Phase::new(f64::NAN, 1),
            Err(PhaseError::Duration(_))
        ));
        assert_eq!(Phase::new(1.0, 0), Err(PhaseError::Steps));
    }
}
