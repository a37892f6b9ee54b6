//! Regroups solved center temperatures by the block they came from.

use nalgebra::DVector;
use thiserror::Error;

use crate::{
    graph::NodeGraph,
    model::{BlockId, Chiplet, FlatModel, Layer, Model, UnitId},
};

/// Center temperatures grouped per block, nested like the input model.
pub type TemperatureTree = Model<BlockTemperatures>;

/// Errors that can occur while aggregating a temperature vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    #[error("temperature vector has {found} entries, but the graph has {expected} nodes")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("node graph references unit {0:?}, which is not in the model")]
    UnknownUnit(UnitId),
}

/// The center temperatures of one block's units, in flattening order.
///
/// Always holds at least one temperature.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockTemperatures {
    block: BlockId,
    temperatures: Vec<f64>,
}

/// Maximum, minimum and mean of a set of temperatures.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub max: f64,
    pub min: f64,
    pub average: f64,
}

impl BlockTemperatures {
    fn new(block: BlockId, first: f64) -> Self {
        Self {
            block,
            temperatures: vec![first],
        }
    }

    #[must_use]
    pub fn block(&self) -> BlockId {
        self.block
    }

    #[must_use]
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    #[must_use]
    pub fn average(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let n = self.temperatures.len() as f64;
        self.temperatures.iter().sum::<f64>() / n
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.temperatures.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.temperatures.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Returns the temperature at the middle of the block.
    ///
    /// A square grid with an odd side yields its middle unit and one with an
    /// even side yields the mean of its four central units. Any other count
    /// yields the unit at index `n / 2`.
    #[must_use]
    pub fn center(&self) -> f64 {
        let t = &self.temperatures;
        let n = t.len();
        let side = n.isqrt();

        if n == 1 || side * side != n || side % 2 == 1 {
            return t[n / 2];
        }

        let half = side / 2;
        let corners = [
            (half - 1) * side + (half - 1),
            (half - 1) * side + half,
            half * side + (half - 1),
            half * side + half,
        ];
        corners.iter().map(|&i| t[i]).sum::<f64>() / 4.0
    }

    /// Returns a copy with every temperature shifted by `offset`.
    #[must_use]
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            block: self.block,
            temperatures: self.temperatures.iter().map(|t| t + offset).collect(),
        }
    }
}

impl Summary {
    /// Summarizes `values`.
    ///
    /// Returns `None` if `values` is empty.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut values = values.into_iter();
        let first = values.next()?;

        let (max, min, sum, count) = values.fold((first, first, first, 1_usize), |acc, v| {
            (acc.0.max(v), acc.1.min(v), acc.2 + v, acc.3 + 1)
        });

        #[allow(clippy::cast_precision_loss)]
        let average = sum / count as f64;
        Some(Self { max, min, average })
    }
}

/// Groups the center temperatures of `temperatures` by originating block.
///
/// Center nodes are walked in index order and a new group starts whenever
/// the owning block changes, so each block's units keep their flattening
/// order.
///
/// # Errors
///
/// Returns an [`AggregateError`] if the vector does not match the graph or
/// the graph does not match the model.
pub fn aggregate(
    model: &FlatModel,
    graph: &NodeGraph,
    temperatures: &DVector<f64>,
) -> Result<TemperatureTree, AggregateError> {
    if temperatures.len() != graph.len() {
        return Err(AggregateError::DimensionMismatch {
            expected: graph.len(),
            found: temperatures.len(),
        });
    }

    let mut tree: TemperatureTree = Model::new(Vec::new());

    for (index, id) in graph.centers() {
        let unit = model.unit(id).ok_or(AggregateError::UnknownUnit(id))?;
        let block = unit.origin;
        let value = temperatures[index];

        if tree.layers.len() <= block.layer {
            tree.layers.resize_with(block.layer + 1, || Layer::new(Vec::new()));
        }
        let chiplets = &mut tree.layers[block.layer].chiplets;
        if chiplets.len() <= block.chiplet {
            chiplets.resize_with(block.chiplet + 1, || Chiplet::new(Vec::new()));
        }
        let blocks = &mut chiplets[block.chiplet].elements;

        if let Some(group) = blocks.last_mut().filter(|group| group.block == block) {
            group.temperatures.push(value);
        } else {
            blocks.push(BlockTemperatures::new(block, value));
        }
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{
        flatten::flatten,
        model::{Block, Power, Resolution},
    };

    fn temps(values: &[f64]) -> BlockTemperatures {
        BlockTemperatures {
            block: BlockId::new(0, 0, 0),
            temperatures: values.to_vec(),
        }
    }

    fn block(left_x: f64, resolution: Resolution) -> Block {
        Block {
            volumetric_heat_capacity: 1.6e6,
            conductivity: 100.0,
            thickness: 0.001,
            resolution,
            left_x,
            bottom_y: 0.0,
            width: 0.01,
            height: 0.01,
            power: Power::default(),
        }
    }

    #[test]
    fn statistics_of_a_block() {
        let t = temps(&[1.0, 4.0, 2.0, 5.0]);

        assert_relative_eq!(t.average(), 3.0);
        assert_relative_eq!(t.max(), 5.0);
        assert_relative_eq!(t.min(), 1.0);
    }

    #[test]
    fn center_of_single_unit() {
        assert_relative_eq!(temps(&[7.0]).center(), 7.0);
    }

    #[test]
    fn center_of_odd_square_is_middle_unit() {
        let t = temps(&[0.0, 0.0, 0.0, 0.0, 9.0, 0.0, 0.0, 0.0, 0.0]);
        assert_relative_eq!(t.center(), 9.0);
    }

    #[test]
    fn center_of_even_square_averages_four_units() {
        let mut values = vec![0.0; 16];
        values[5] = 1.0;
        values[6] = 2.0;
        values[9] = 3.0;
        values[10] = 6.0;

        assert_relative_eq!(temps(&values).center(), 3.0);
        assert_relative_eq!(temps(&[1.0, 2.0, 3.0, 6.0]).center(), 3.0);
    }

    #[test]
    fn center_of_other_counts_is_half_index() {
        assert_relative_eq!(temps(&[1.0, 2.0, 3.0]).center(), 2.0);
        assert_relative_eq!(temps(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).center(), 4.0);
    }

    #[test]
    fn summary_of_values() {
        let summary = Summary::of([2.0, -1.0, 5.0]).unwrap();

        assert_relative_eq!(summary.max, 5.0);
        assert_relative_eq!(summary.min, -1.0);
        assert_relative_eq!(summary.average, 2.0);
        assert!(Summary::of(Vec::new()).is_none());
    }

    #[test]
    fn groups_follow_originating_blocks() {
        let model = Model::from_nested(vec![
            vec![vec![
                block(0.0, Resolution::new(2, 2)),
                block(0.01, Resolution::new(1, 1)),
            ]],
            vec![vec![block(0.0, Resolution::new(3, 1))]],
        ]);
        let flat = flatten(&model).unwrap();
        let graph = NodeGraph::build(&flat);

        // Each center carries the index of its unit in the chiplet.
        let mut vector = DVector::zeros(graph.len());
        for (index, id) in graph.centers() {
            #[allow(clippy::cast_precision_loss)]
            let value = id.unit as f64;
            vector[index] = value;
        }

        let tree = aggregate(&flat, &graph, &vector).unwrap();

        assert_eq!(tree.layer_count(), 2);
        let lower = &tree.layers[0].chiplets[0].elements;
        assert_eq!(lower.len(), 2);
        assert_eq!(lower[0].block(), BlockId::new(0, 0, 0));
        assert_eq!(lower[0].temperatures(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(lower[1].temperatures(), &[4.0]);
        let upper = &tree.layers[1].chiplets[0].elements;
        assert_eq!(upper[0].temperatures(), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn vector_length_must_match_graph() {
        let flat = flatten(&Model::from_nested(vec![vec![vec![block(
            0.0,
            Resolution::default(),
        )]]]))
        .unwrap();
        let graph = NodeGraph::build(&flat);

        let err = aggregate(&flat, &graph, &DVector::zeros(3)).unwrap_err();

        assert_eq!(
            err,
            AggregateError::DimensionMismatch {
                expected: 7,
                found: 3
            }
        );
    }

    #[test]
    fn shifted_offsets_every_temperature() {
        let t = temps(&[1.0, 2.0]).shifted(300.0);
        assert_eq!(t.temperatures(), &[301.0, 302.0]);
    }
}
