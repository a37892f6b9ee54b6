use ctm_core::{
    aggregate::AggregateError,
    flatten::FlattenError,
    mna::{AssemblyError, ExcitationError},
};
use ctm_solvers::{linear, transient::backward_euler};
use thiserror::Error;

use crate::{config::ConfigError, model_file::ModelFileError};

/// Errors that can occur while preparing or running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("the simulation must be prepared before it is solved")]
    NotPrepared,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ModelFile(#[from] ModelFileError),

    #[error("failed to flatten model: {0}")]
    Flatten(#[from] FlattenError),

    #[error("failed to assemble thermal network: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("invalid power excitation: {0}")]
    Excitation(#[from] ExcitationError),

    #[error("steady-state solve failed: {0}")]
    Steady(#[from] linear::Error),

    #[error("transient solve failed: {0}")]
    Transient(#[from] backward_euler::Error),

    #[error("failed to aggregate temperatures: {0}")]
    Aggregate(#[from] AggregateError),
}
