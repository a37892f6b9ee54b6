use ctm_core::Observer;

use crate::traits::{CanStopEarly, HasProgress, HasTemperatures};

/// Stops a run as soon as any node rises more than `limit` above ambient.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureLimit {
    limit: f64,
    tripped_at: Option<f64>,
}

impl TemperatureLimit {
    /// Creates an observer with a limit on the temperature rise, in kelvin.
    #[must_use]
    pub fn new(limit: f64) -> Self {
        Self {
            limit,
            tripped_at: None,
        }
    }

    /// Returns the simulated time at which the limit was exceeded, if it was.
    #[must_use]
    pub fn tripped_at(&self) -> Option<f64> {
        self.tripped_at
    }
}

impl<E, A> Observer<E, A> for TemperatureLimit
where
    E: HasTemperatures + HasProgress,
    A: CanStopEarly,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        let hottest = event
            .temperatures()
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        if hottest > self.limit {
            log::warn!(
                "temperature rise {hottest:.3} K exceeds limit {:.3} K at t = {:.3e} s",
                self.limit,
                event.time()
            );
            self.tripped_at = Some(event.time());
            return Some(A::stop_early());
        }
        None
    }
}

/// Allows `&mut TemperatureLimit` to be passed to solvers that take an
/// observer by value, so [`TemperatureLimit::tripped_at`] can be read after
/// the solve.
impl<E, A> Observer<E, A> for &mut TemperatureLimit
where
    E: HasTemperatures + HasProgress,
    A: CanStopEarly,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        (*self).observe(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ctm_core::mna::MnaSystem;
    use ctm_solvers::transient::{
        Phase,
        backward_euler::{self, Status},
    };
    use nalgebra::{dmatrix, dvector};

    #[test]
    fn stops_a_heating_run_at_the_limit() {
        // One mass heading to a steady rise of 5 K.
        let system = MnaSystem::from_matrices(dmatrix![2.0], dmatrix![4.0]).unwrap();
        let phases = [Phase::new(20.0, 100).unwrap()];
        let excitations = [dvector![10.0]];
        let mut limit = TemperatureLimit::new(2.5);

        let solution =
            backward_euler::solve(&system, &phases, &excitations, None, &mut limit).unwrap();

        assert_eq!(solution.status, Status::StoppedByObserver);
        let last = solution.last().unwrap();
        assert!(last.temperatures[0] > 2.5);
        assert!(solution.history[solution.steps - 2].temperatures[0] <= 2.5);
        assert_relative_eq!(limit.tripped_at().unwrap(), last.time);
    }

    #[test]
    fn completes_below_the_limit() {
        let system = MnaSystem::from_matrices(dmatrix![2.0], dmatrix![4.0]).unwrap();
        let phases = [Phase::new(1.0, 10).unwrap()];
        let excitations = [dvector![1.0]];
        let mut limit = TemperatureLimit::new(100.0);

        let solution =
            backward_euler::solve(&system, &phases, &excitations, None, &mut limit).unwrap();

        assert_eq!(solution.status, Status::Complete);
        assert!(limit.tripped_at().is_none());
    }
}
