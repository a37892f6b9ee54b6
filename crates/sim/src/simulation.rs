use std::time::Instant;

use ctm_core::{
    Observer,
    flatten::flatten,
    graph::{Node, NodeGraph},
    mna::{self, MnaSystem},
    model::{Block, FlatModel, Model},
};
use ctm_observers::LogProgress;
use ctm_solvers::{
    steady,
    transient::backward_euler::{self, Action, Event, Status},
};

use crate::{
    config::RunConfig,
    error::SimulationError,
    materials::MaterialLibrary,
    model_file::ModelFile,
    report::{RunReport, SteadyReport, TemperatureReport, TransientPoint, TransientReport},
};

/// Owns a model, its run configuration and, once prepared, the assembled
/// thermal network.
///
/// The network is built by [`Simulation::prepare`]. Solving before that
/// fails with [`SimulationError::NotPrepared`]. Solves only borrow the
/// prepared state, so any number of runs can share one assembly.
#[derive(Debug, Clone)]
pub struct Simulation {
    model: Model<Block>,
    config: RunConfig,
    prepared: Option<Prepared>,
}

/// Everything derived from the input model.
#[derive(Debug, Clone)]
struct Prepared {
    flat: FlatModel,
    graph: NodeGraph,
    system: MnaSystem,
}

impl Simulation {
    /// Creates an unprepared simulation.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] if `config` does not validate.
    pub fn new(model: Model<Block>, config: RunConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            model,
            config,
            prepared: None,
        })
    }

    /// Creates an unprepared simulation from a model file.
    ///
    /// # Errors
    ///
    /// Returns an error if a block's material is unknown or `config` does
    /// not validate.
    pub fn from_model_file(
        file: &ModelFile,
        library: &MaterialLibrary,
        config: RunConfig,
    ) -> Result<Self, SimulationError> {
        Self::new(file.to_model(library)?, config)
    }

    #[must_use]
    pub fn model(&self) -> &Model<Block> {
        &self.model
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    /// Flattens the model, builds the node graph and assembles `G` and `C`.
    ///
    /// Preparing again rebuilds everything from the input model, undoing any
    /// [`Simulation::remove_boundary`] calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be flattened or assembled.
    pub fn prepare(&mut self) -> Result<(), SimulationError> {
        self.prepared = None;

        let start = Instant::now();
        let flat = flatten(&self.model)?;
        log::info!(
            "flattened {} blocks into {} units in {:?}",
            self.model.element_count(),
            flat.element_count(),
            start.elapsed()
        );

        let start = Instant::now();
        let graph = NodeGraph::build(&flat);
        log::info!("built node graph of {} nodes in {:?}", graph.len(), start.elapsed());

        let system = assemble(&flat, &graph, self.config.convection())?;
        self.prepared = Some(Prepared {
            flat,
            graph,
            system,
        });
        Ok(())
    }

    /// Removes a boundary node and reassembles the network without it.
    ///
    /// Returns the removed node, or `None` if `index` is not a boundary node,
    /// in which case nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NotPrepared`] before [`Simulation::prepare`].
    pub fn remove_boundary(&mut self, index: usize) -> Result<Option<Node>, SimulationError> {
        let convection = self.config.convection();
        let prepared = self.prepared.as_mut().ok_or(SimulationError::NotPrepared)?;

        let mut graph = prepared.graph.clone();
        let Some(removed) = graph.remove_boundary(index) else {
            return Ok(None);
        };

        prepared.system = assemble(&prepared.flat, &graph, convection)?;
        prepared.graph = graph;
        Ok(Some(removed))
    }

    /// Returns the flattened model.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NotPrepared`] before [`Simulation::prepare`].
    pub fn flat_model(&self) -> Result<&FlatModel, SimulationError> {
        Ok(&self.prepared()?.flat)
    }

    /// Returns the node graph.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NotPrepared`] before [`Simulation::prepare`].
    pub fn graph(&self) -> Result<&NodeGraph, SimulationError> {
        Ok(&self.prepared()?.graph)
    }

    /// Returns the assembled system.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NotPrepared`] before [`Simulation::prepare`].
    pub fn system(&self) -> Result<&MnaSystem, SimulationError> {
        Ok(&self.prepared()?.system)
    }

    /// Solves `G·ΔT = I` with every unit at its steady power.
    ///
    /// # Errors
    ///
    /// Returns an error if the simulation is not prepared or the system
    /// cannot be solved.
    pub fn steady_state(&self) -> Result<SteadyReport, SimulationError> {
        let Prepared {
            flat,
            graph,
            system,
        } = self.prepared()?;
        let base = self.config.base_temperature_k();

        let start = Instant::now();
        let excitation = mna::steady_excitation(flat, graph)?;
        let rise = steady::solve(system, &excitation)?;
        log::info!("solved steady state in {:?}", start.elapsed());

        Ok(SteadyReport {
            base_temperature: base,
            temperatures: TemperatureReport::new(flat, graph, &rise, base)?,
        })
    }

    /// Integrates the configured phase schedule, logging progress.
    ///
    /// # Errors
    ///
    /// See [`Simulation::transient_observed`].
    pub fn transient(&self) -> Result<TransientReport, SimulationError> {
        self.transient_observed(LogProgress::new())
    }

    /// Integrates the configured phase schedule from ambient.
    ///
    /// The observer sees every substep and may stop the run early, in which
    /// case the report holds the points computed so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the simulation is not prepared, a block's power
    /// sequence does not match the schedule, or a phase cannot be solved.
    pub fn transient_observed<Obs>(&self, observer: Obs) -> Result<TransientReport, SimulationError>
    where
        Obs: Observer<Event, Action>,
    {
        let Prepared {
            flat,
            graph,
            system,
        } = self.prepared()?;
        let base = self.config.base_temperature_k();
        let phases = self.config.schedule()?;

        let start = Instant::now();
        let excitations = mna::phase_excitations(flat, graph, phases.len())?;
        let solution = backward_euler::solve(system, &phases, &excitations, None, observer)?;
        log::info!(
            "integrated {} transient steps in {:?}",
            solution.steps,
            start.elapsed()
        );

        let points = solution
            .history
            .iter()
            .map(|snapshot| -> Result<_, SimulationError> {
                Ok(TransientPoint {
                    phase: snapshot.phase,
                    substep: snapshot.substep,
                    time: snapshot.time,
                    temperatures: TemperatureReport::new(
                        flat,
                        graph,
                        &snapshot.temperatures,
                        base,
                    )?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransientReport {
            base_temperature: base,
            stopped_early: solution.status == Status::StoppedByObserver,
            points,
        })
    }

    /// Prepares if needed, then runs every analysis the configuration
    /// enables.
    ///
    /// # Errors
    ///
    /// Returns the first error from preparing or from either analysis.
    pub fn run(&mut self) -> Result<RunReport, SimulationError> {
        if !self.is_prepared() {
            self.prepare()?;
        }

        let steady_state = if self.config.steady_state {
            Some(self.steady_state()?)
        } else {
            None
        };
        let transient = if self.config.transient {
            Some(self.transient()?)
        } else {
            None
        };

        Ok(RunReport {
            steady_state,
            transient,
        })
    }

    fn prepared(&self) -> Result<&Prepared, SimulationError> {
        self.prepared.as_ref().ok_or(SimulationError::NotPrepared)
    }
}

fn assemble(
    flat: &FlatModel,
    graph: &NodeGraph,
    convection: f64,
) -> Result<MnaSystem, SimulationError> {
    let start = Instant::now();
    let system = mna::assemble(flat, graph, convection)?;
    log::info!(
        "assembled {n}x{n} thermal network in {:?}",
        start.elapsed(),
        n = system.dim()
    );
    Ok(system)
}
