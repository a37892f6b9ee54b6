//! Backward Euler solver for assembled thermal networks.
//!
//! Each substep of size `h` solves the implicit update
//!
//! ```text
//! (G + C/h) · x_{n+1} = I_phase + (C/h) · x_n
//! ```
//!
//! The left-hand matrix only changes with `h`, so it is factored once per
//! phase and reused for every substep of that phase.
//!
//! # Example
//!
//! ```ignore
//! use ctm_solvers::transient::{Phase, backward_euler};
//!
//! let phases = [Phase::new(1.0, 10)?, Phase::new(4.0, 20)?];
//! let solution = backward_euler::solve_unobserved(&system, &phases, &excitations, None)?;
//!
//! for snapshot in &solution.history {
//!     println!("t={}: {}", snapshot.time, snapshot.temperatures.max());
//! }
//! ```

mod action;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use error::Error;
pub use event::{Event, Snapshot};
pub use solution::{Solution, Status};

use ctm_core::{Observer, mna::MnaSystem};
use nalgebra::{DMatrix, DVector};

use crate::linear::{self, Factorization};

use super::Phase;

/// Integrates an assembled system over a schedule of phases.
///
/// `excitations` holds one vector per phase. Integration starts from
/// `initial`, or from ambient (all zeros) when `None`.
///
/// # Observer
///
/// The observer receives an [`Event`] after each substep and may return
/// [`Action::StopEarly`] to end the run with the history so far.
///
/// # Errors
///
/// Returns an error if the number of excitations does not match the number
/// of phases, if a vector has the wrong length, or if `G + C/h` cannot be
/// solved for some phase.
pub fn solve<Obs>(
    system: &MnaSystem,
    phases: &[Phase],
    excitations: &[DVector<f64>],
    initial: Option<DVector<f64>>,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    Obs: Observer<Event, Action>,
{
    let n = system.dim();

    if phases.len() != excitations.len() {
        return Err(Error::ExcitationCount {
            phases: phases.len(),
            excitations: excitations.len(),
        });
    }
    if let Some((phase, excitation)) = excitations.iter().enumerate().find(|(_, i)| i.len() != n) {
        return Err(Error::Linear {
            phase,
            source: linear::Error::DimensionMismatch {
                expected: n,
                actual: excitation.len(),
            },
        });
    }

    let mut x = match initial {
        Some(x) if x.len() != n => {
            return Err(Error::InitialState {
                expected: n,
                found: x.len(),
            });
        }
        Some(x) => x,
        None => DVector::zeros(n),
    };

    let total_steps = phases.iter().map(Phase::steps).sum();
    let capacitance = system.capacitance().diagonal();
    let mut history = Vec::with_capacity(total_steps);
    let mut step = 0;
    let mut start = 0.0;

    for (index, (phase, excitation)) in phases.iter().zip(excitations).enumerate() {
        let h = phase.step_size();
        let c_over_h = &capacitance / h;
        let a = system.conductance() + DMatrix::from_diagonal(&c_over_h);
        let lu = Factorization::new(&a).map_err(Error::linear(index))?;

        log::debug!("phase {index}: {} steps of {h:e} s", phase.steps());

        for substep in 0..phase.steps() {
            let rhs = excitation + c_over_h.component_mul(&x);
            x = lu.solve(&rhs).map_err(Error::linear(index))?;
            step += 1;

            #[allow(clippy::cast_precision_loss)]
            let elapsed = h * (substep + 1) as f64;
            let snapshot = Snapshot {
                phase: index,
                substep,
                time: start + elapsed,
                temperatures: x.clone(),
            };
            history.push(snapshot.clone());

            let event = Event {
                step,
                total_steps,
                snapshot,
            };
            if let Some(Action::StopEarly) = observer.observe(&event) {
                return Ok(Solution {
                    status: Status::StoppedByObserver,
                    history,
                    steps: step,
                });
            }
        }

        start += phase.duration();
    }

    Ok(Solution {
        status: Status::Complete,
        history,
        steps: step,
    })
}

/// Integrates an assembled system without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// See [`solve`].
pub fn solve_unobserved(
    system: &MnaSystem,
    phases: &[Phase],
    excitations: &[DVector<f64>],
    initial: Option<DVector<f64>>,
) -> Result<Solution, Error> {
    solve(system, phases, excitations, initial, ())
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, dvector};

    // --- Test fixtures ---

    /// A single node with conductance 2 W/K to ambient and capacitance 4 J/K.
    fn lumped() -> MnaSystem {
        MnaSystem::from_matrices(dmatrix![2.0], dmatrix![4.0]).unwrap()
    }

    /// Two nodes in series: a heated mass and a massless junction to ambient.
    fn chain() -> MnaSystem {
        let g = dmatrix![1.0, -1.0; -1.0, 3.0];
        let c = dmatrix![10.0, 0.0; 0.0, 0.0];
        MnaSystem::from_matrices(g, c).unwrap()
    }

    // --- Tests ---

    #[test]
    fn implicit_update_of_a_lumped_mass() {
        let phases = [Phase::new(2.0, 2).unwrap()];
        let excitations = [dvector![10.0]];

        let solution = solve_unobserved(&lumped(), &phases, &excitations, None).unwrap();

        assert_eq!(solution.status, Status::Complete);
        assert_eq!(solution.steps, 2);
        assert_eq!(solution.history.len(), 2);

        // h = 1: x1 = 10 / (2 + 4), x2 = (10 + 4·x1) / 6
        let x1 = 10.0 / 6.0;
        let x2 = (10.0 + 4.0 * x1) / 6.0;
        assert_relative_eq!(solution.history[0].temperatures[0], x1, epsilon = 1e-12);
        assert_relative_eq!(solution.history[1].temperatures[0], x2, epsilon = 1e-12);
        assert_relative_eq!(solution.history[1].time, 2.0);
    }

    #[test]
    fn huge_step_reaches_steady_state() {
        let system = chain();
        let phases = [Phase::new(1e12, 1).unwrap()];
        let excitations = [dvector![6.0, 0.0]];

        let solution = solve_unobserved(&system, &phases, &excitations, None).unwrap();
        let steady = crate::steady::solve(&system, &excitations[0]).unwrap();

        let last = solution.last().unwrap();
        assert_relative_eq!(last.temperatures, steady, max_relative = 1e-9);
    }

    #[test]
    fn phases_change_power_and_time_accumulates() {
        let phases = [Phase::new(1.0, 2).unwrap(), Phase::new(3.0, 3).unwrap()];
        let excitations = [dvector![10.0], dvector![0.0]];

        let solution = solve_unobserved(&lumped(), &phases, &excitations, None).unwrap();

        let times: Vec<f64> = solution.history.iter().map(|s| s.time).collect();
        let expected = [0.5, 1.0, 2.0, 3.0, 4.0];
        for (time, expected) in times.iter().zip(expected) {
            assert_relative_eq!(*time, expected);
        }

        let labels: Vec<(usize, usize)> = solution
            .history
            .iter()
            .map(|s| (s.phase, s.substep))
            .collect();
        assert_eq!(labels, vec![(0, 0), (0, 1), (1, 0), (1, 1), (1, 2)]);

        // Heating then cooling without a source.
        let peak = solution.history[1].temperatures[0];
        let end = solution.history[4].temperatures[0];
        assert!(peak > 0.0);
        assert!(end < peak);
        assert!(end > 0.0);
    }

    #[test]
    fn starts_from_initial_state() {
        let phases = [Phase::new(1.0, 1).unwrap()];
        let excitations = [dvector![0.0]];

        let solution =
            solve_unobserved(&lumped(), &phases, &excitations, Some(dvector![6.0])).unwrap();

        // x1 = (4·6) / (2 + 4)
        assert_relative_eq!(solution.history[0].temperatures[0], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn observer_can_stop_early() {
        let phases = [Phase::new(1.0, 100).unwrap()];
        let excitations = [dvector![1.0]];

        let observer = |event: &Event| {
            if event.step >= 5 {
                Some(Action::StopEarly)
            } else {
                None
            }
        };

        let solution = solve(&lumped(), &phases, &excitations, None, observer).unwrap();

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.steps, 5);
        assert_eq!(solution.history.len(), 5);
    }

    #[test]
    fn step_numbers_span_all_phases() {
        let phases = [Phase::new(1.0, 2).unwrap(), Phase::new(1.0, 1).unwrap()];
        let excitations = [dvector![1.0], dvector![1.0]];

        let mut seen = Vec::new();
        solve(&lumped(), &phases, &excitations, None, |event: &Event| {
            seen.push((event.step, event.total_steps));
            None
        })
        .unwrap();

        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn empty_schedule_completes_immediately() {
        let solution = solve_unobserved(&lumped(), &[], &[], None).unwrap();

        assert_eq!(solution.status, Status::Complete);
        assert_eq!(solution.steps, 0);
        assert!(solution.last().is_none());
    }

    #[test]
    fn excitation_count_must_match_phases() {
        let phases = [Phase::new(1.0, 1).unwrap()];

        let err = solve_unobserved(&lumped(), &phases, &[], None).unwrap_err();

        assert_eq!(
            err,
            Error::ExcitationCount {
                phases: 1,
                excitations: 0
            }
        );
    }

    #[test]
    fn wrong_sized_vectors_are_rejected() {
        let phases = [Phase::new(1.0, 1).unwrap()];

        let excitation = solve_unobserved(&lumped(), &phases, &[dvector![1.0, 2.0]], None);
        let initial = solve_unobserved(
            &lumped(),
            &phases,
            &[dvector![1.0]],
            Some(DVector::zeros(0)),
        );

        assert!(matches!(
            excitation,
            Err(Error::Linear {
                phase: 0,
                source: linear::Error::DimensionMismatch { .. }
            })
        ));
        assert_eq!(
            initial.unwrap_err(),
            Error::InitialState {
                expected: 1,
                found: 0
            }
        );
    }

    #[test]
    fn singular_system_is_fatal() {
        let g = dmatrix![1.0, -1.0; -1.0, 1.0];
        let system = MnaSystem::from_matrices(g, DMatrix::zeros(2, 2)).unwrap();
        let phases = [Phase::new(1.0, 1).unwrap()];

        let err = solve_unobserved(&system, &phases, &[dvector![1.0, 0.0]], None).unwrap_err();

        assert_eq!(
            err,
            Error::Linear {
                phase: 0,
                source: linear::Error::SingularMatrix
            }
        );
    }
}
