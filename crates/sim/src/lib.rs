//! Run driver for compact thermal models.
//!
//! Ties the pipeline together: a [`ModelFile`] names materials from a
//! [`MaterialLibrary`], a [`RunConfig`] sets ambient conditions and the
//! transient schedule, and a [`Simulation`] prepares the thermal network
//! once and produces serializable reports.
//!
//! ```no_run
//! use ctm_sim::{MaterialLibrary, ModelFile, RunConfig, Simulation};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = ModelFile::from_path("package.toml")?;
//! let config = RunConfig::from_path("run.toml")?;
//!
//! let mut sim = Simulation::from_model_file(&file, &MaterialLibrary::standard(), config)?;
//! let report = sim.run()?;
//! println!("{}", report.to_json()?);
//! # Ok(())
//! # }
//! ```
//!
//! Progress and stage timings are reported through the `log` facade; install
//! any logger to see them.

pub mod config;
mod error;
pub mod materials;
pub mod model_file;
pub mod report;
mod simulation;

pub use config::RunConfig;
pub use error::SimulationError;
pub use materials::{Material, MaterialLibrary};
pub use model_file::ModelFile;
pub use simulation::Simulation;
