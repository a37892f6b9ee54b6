//! Solvers for assembled compact thermal models.
//!
//! - [`steady`] solves `G·x = I` once.
//! - [`transient::backward_euler`] integrates `C·dx/dt + G·x = I` over a
//!   schedule of phases.
//!
//! Both work on the dense LU factorization in [`linear`].

pub mod linear;
pub mod steady;
pub mod transient;
