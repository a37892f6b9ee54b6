//! Reusable observers for compact thermal model solvers.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work across solvers, so an observer written once can watch any solver whose
//! events and actions implement the traits it needs.
//!
//! # Modules
//!
//! - [`traits`] — capability traits ([`HasProgress`], [`HasTemperatures`],
//!   [`CanStopEarly`])
//! - [`LogProgress`] — logs transient progress through the `log` facade
//! - [`TemperatureLimit`] — stops a run once any node exceeds a limit
//!
//! [`Observer`]: ctm_core::Observer
//! [`HasProgress`]: traits::HasProgress
//! [`HasTemperatures`]: traits::HasTemperatures
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod traits;

mod limit;
mod progress;

pub use limit::TemperatureLimit;
pub use progress::LogProgress;
