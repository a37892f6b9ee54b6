//! Serializable simulation results.
//!
//! Every temperature in a report is absolute, in kelvin: the solved rise plus
//! the run's base temperature.

use ctm_core::{
    aggregate::{self, AggregateError, BlockTemperatures, Summary},
    graph::NodeGraph,
    model::{BlockId, FlatModel},
};
use nalgebra::DVector;
use serde::Serialize;

/// Temperatures of one input block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockReport {
    pub block: BlockId,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub center: f64,
    /// Unit temperatures, row by row from the bottom-left unit.
    pub temperatures: Vec<f64>,
}

impl From<&BlockTemperatures> for BlockReport {
    fn from(block: &BlockTemperatures) -> Self {
        Self {
            block: block.block(),
            average: block.average(),
            max: block.max(),
            min: block.min(),
            center: block.center(),
            temperatures: block.temperatures().to_vec(),
        }
    }
}

/// One solved temperature field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReport {
    /// Statistics over every node of the network, grounds included.
    ///
    /// `None` only for an empty model.
    pub summary: Option<Summary>,

    /// Per-block statistics in model order.
    pub blocks: Vec<BlockReport>,

    /// Every node temperature, indexed like the node graph.
    pub nodes: Vec<f64>,
}

impl TemperatureReport {
    /// Builds a report from a vector of rises above `base`.
    pub(crate) fn new(
        model: &FlatModel,
        graph: &NodeGraph,
        rise: &DVector<f64>,
        base: f64,
    ) -> Result<Self, AggregateError> {
        let tree = aggregate::aggregate(model, graph, rise)?;
        let blocks = tree
            .iter()
            .map(|(_, block)| BlockReport::from(&block.shifted(base)))
            .collect();
        let nodes: Vec<f64> = rise.iter().map(|t| t + base).collect();

        Ok(Self {
            summary: Summary::of(nodes.iter().copied()),
            blocks,
            nodes,
        })
    }

    /// Returns the report for `id`, if the model has that block.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BlockReport> {
        self.blocks.iter().find(|report| report.block == id)
    }

    /// Returns the block with the highest peak temperature.
    #[must_use]
    pub fn hottest_block(&self) -> Option<&BlockReport> {
        self.blocks.iter().max_by(|a, b| a.max.total_cmp(&b.max))
    }
}

/// Result of a steady-state analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SteadyReport {
    pub base_temperature: f64,
    pub temperatures: TemperatureReport,
}

/// One substep of a transient analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransientPoint {
    pub phase: usize,
    pub substep: usize,
    /// Time at the end of the substep, in seconds.
    pub time: f64,
    pub temperatures: TemperatureReport,
}

/// Result of a transient analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransientReport {
    pub base_temperature: f64,
    /// Whether an observer ended the run before the schedule finished.
    pub stopped_early: bool,
    pub points: Vec<TransientPoint>,
}

impl TransientReport {
    #[must_use]
    pub fn last(&self) -> Option<&TransientPoint> {
        self.points.last()
    }
}

/// Results of every analysis enabled in the run configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RunReport {
    pub steady_state: Option<SteadyReport>,
    pub transient: Option<TransientReport>,
}

impl RunReport {
    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ctm_core::{
        flatten::flatten,
        model::{Block, Model, Power, Resolution},
    };

    fn strip() -> (FlatModel, NodeGraph) {
        let block = Block {
            volumetric_heat_capacity: 1.6e6,
            conductivity: 100.0,
            thickness: 0.001,
            resolution: Resolution::new(3, 1),
            left_x: 0.0,
            bottom_y: 0.0,
            width: 0.003,
            height: 0.001,
            power: Power::Constant(1.0),
        };
        let flat = flatten(&Model::from_nested(vec![vec![vec![block]]])).unwrap();
        let graph = NodeGraph::build(&flat);
        (flat, graph)
    }

    #[test]
    fn temperatures_are_shifted_by_the_base() {
        let (flat, graph) = strip();
        let mut rise = DVector::zeros(graph.len());
        for (offset, (index, _)) in graph.centers().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let value = 1.0 + offset as f64;
            rise[index] = value;
        }

        let report = TemperatureReport::new(&flat, &graph, &rise, 300.0).unwrap();

        assert_eq!(report.blocks.len(), 1);
        let block = report.block(BlockId::new(0, 0, 0)).unwrap();
        assert_eq!(block.temperatures, vec![301.0, 302.0, 303.0]);
        assert_relative_eq!(block.average, 302.0);
        assert_relative_eq!(block.center, 302.0);
        assert_relative_eq!(block.min, 301.0);

        let summary = report.summary.unwrap();
        assert_relative_eq!(summary.max, 303.0);
        assert_relative_eq!(summary.min, 300.0);
        assert_eq!(report.nodes.len(), graph.len());
    }

    #[test]
    fn mismatched_vectors_are_rejected() {
        let (flat, graph) = strip();

        let err = TemperatureReport::new(&flat, &graph, &DVector::zeros(1), 300.0).unwrap_err();

        assert_eq!(
            err,
            AggregateError::DimensionMismatch {
                expected: graph.len(),
                found: 1
            }
        );
    }

    #[test]
    fn reports_serialize_to_json() {
        let (flat, graph) = strip();
        let temperatures =
            TemperatureReport::new(&flat, &graph, &DVector::zeros(graph.len()), 318.5).unwrap();
        let report = RunReport {
            steady_state: Some(SteadyReport {
                base_temperature: 318.5,
                temperatures,
            }),
            transient: None,
        };

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["transient"], serde_json::Value::Null);
        assert_eq!(json["steady_state"]["temperatures"]["blocks"][0]["block"]["layer"], 0);
        assert_eq!(json["steady_state"]["base_temperature"], 318.5);
    }
}
