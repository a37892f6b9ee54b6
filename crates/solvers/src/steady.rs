//! Steady-state solver.

use ctm_core::mna::MnaSystem;
use nalgebra::DVector;

use crate::linear::{self, Error};

/// Solves `G·x = I` for the temperature rise of every node.
///
/// # Errors
///
/// Returns an [`Error`] if `G` is singular or ill-conditioned, or if the
/// excitation does not match the system dimension.
pub fn solve(system: &MnaSystem, excitation: &DVector<f64>) -> Result<DVector<f64>, Error> {
    linear::solve_dense(system.conductance(), excitation)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, dmatrix, dvector};

    #[test]
    fn resistor_divider() {
        // Node 0 feeds node 1 through 1 W/K; node 1 sinks to ambient through 3 W/K.
        let g = dmatrix![1.0, -1.0; -1.0, 4.0];
        let system = MnaSystem::from_matrices(g, DMatrix::zeros(2, 2)).unwrap();

        let x = solve(&system, &dvector![6.0, 0.0]).unwrap();

        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(x[0], 8.0, epsilon = 1e-12);
    }

    #[test]
    fn floating_network_is_singular() {
        let g = dmatrix![1.0, -1.0; -1.0, 1.0];
        let system = MnaSystem::from_matrices(g, DMatrix::zeros(2, 2)).unwrap();

        assert_eq!(
            solve(&system, &dvector![1.0, 0.0]),
            Err(Error::SingularMatrix)
        );
    }
}
