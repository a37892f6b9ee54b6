//! Dense linear solves.

use nalgebra::{DMatrix, DVector, Dyn, LU};
use thiserror::Error;

/// Smallest accepted ratio of the smallest to the largest pivot magnitude.
///
/// Pivots are the diagonal of `U` in the partially pivoted factorization.
/// A ratio below this bound loses roughly twelve significant digits.
pub const MIN_PIVOT_RATIO: f64 = 1e-12;

/// Errors that can occur during a linear solve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("singular matrix")]
    SingularMatrix,

    #[error("ill-conditioned matrix")]
    IllConditioned,

    #[error("invalid matrix dimensions: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// An LU factorization that can be reused for many right-hand sides.
#[derive(Debug, Clone)]
pub struct Factorization {
    lu: LU<f64, Dyn, Dyn>,
    dim: usize,
}

impl Factorization {
    /// Factors a square matrix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `a` is not square,
    /// [`Error::SingularMatrix`] on a zero pivot, and
    /// [`Error::IllConditioned`] if the pivot magnitudes span more than
    /// [`MIN_PIVOT_RATIO`] allows.
    pub fn new(a: &DMatrix<f64>) -> Result<Self, Error> {
        if !a.is_square() {
            return Err(Error::DimensionMismatch {
                expected: a.nrows(),
                actual: a.ncols(),
            });
        }

        let lu = a.clone().lu();
        check_pivots(&lu)?;

        Ok(Self { lu, dim: a.nrows() })
    }

    /// Solves `A·x = b`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllConditioned`] if the solution is not finite and
    /// [`Error::DimensionMismatch`] if `b` has the wrong length.
    pub fn solve(&self, b: &DVector<f64>) -> Result<DVector<f64>, Error> {
        if b.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: b.len(),
            });
        }

        let x = self.lu.solve(b).ok_or(Error::SingularMatrix)?;
        if x.iter().all(|v| v.is_finite()) {
            Ok(x)
        } else {
            Err(Error::IllConditioned)
        }
    }
}

fn check_pivots(lu: &LU<f64, Dyn, Dyn>) -> Result<(), Error> {
    let u = lu.u();
    if u.is_empty() {
        return Ok(());
    }

    let (min, max) = u
        .diagonal()
        .iter()
        .map(|p| p.abs())
        .fold((f64::INFINITY, 0.0_f64), |(min, max), p| (min.min(p), max.max(p)));

    if min == 0.0 {
        return Err(Error::SingularMatrix);
    }
    if !max.is_finite() || min / max < MIN_PIVOT_RATIO {
        log::warn!("pivot ratio {:e} is below {MIN_PIVOT_RATIO:e}", min / max);
        return Err(Error::IllConditioned);
    }
    Ok(())
}

/// Solves `A·x = b` with a one-off LU factorization.
///
/// # Errors
///
/// See [`Factorization::solve`].
pub fn solve_dense(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, Error> {
    if a.nrows() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.nrows(),
            actual: b.len(),
        });
    }
    Factorization::new(a)?.solve(b)
}
