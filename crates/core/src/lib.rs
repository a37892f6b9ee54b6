//! Core types and model compilation for compact thermal models.
//!
//! This crate turns a stack of rectangular blocks into a thermal RC network
//! and back:
//!
//! - [`model`] — layers, chiplets, blocks and the units they flatten into
//! - [`geometry`] — adjacency, superposition and thermal resistances
//! - [`flatten`] — subdivides blocks into units
//! - [`graph`] — the ordered node set of a flattened model
//! - [`mna`] — assembles `G`, `C` and excitation vectors
//! - [`aggregate`] — regroups solved temperatures by block
//! - [`Observer`] — receives solver events and optionally returns actions

pub mod aggregate;
pub mod flatten;
pub mod geometry;
pub mod graph;
pub mod mna;
pub mod model;
mod observer;

pub use observer::Observer;
