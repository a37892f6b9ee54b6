use crate::{
    geometry::{Border, Face},
    model::UnitId,
};

/// A row of the MNA system.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// Bulk temperature of a unit.
    Center {
        unit: UnitId,
        /// Indices of this unit's ground nodes.
        grounds: Vec<usize>,
    },

    /// Junction between two laterally adjacent units of one chiplet.
    Boundary2d { first: UnitId, second: UnitId },

    /// Junction between two superposed units on adjacent layers.
    Boundary3d { top: UnitId, bottom: UnitId },

    /// An exposed lateral border, pinned to ambient.
    GroundEdge { unit: UnitId, border: Border },

    /// The part of a top or bottom face not covered by a neighboring layer.
    GroundArea { unit: UnitId, face: Face, area: f64 },
}

impl Node {
    /// Returns the unit this node belongs to, if it belongs to exactly one.
    #[must_use]
    pub fn unit(&self) -> Option<UnitId> {
        match self {
            Self::Center { unit, .. }
            | Self::GroundEdge { unit, .. }
            | Self::GroundArea { unit, .. } => Some(*unit),
            Self::Boundary2d { .. } | Self::Boundary3d { .. } => None,
        }
    }

    #[must_use]
    pub fn is_center(&self) -> bool {
        matches!(self, Self::Center { .. })
    }

    #[must_use]
    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary2d { .. } | Self::Boundary3d { .. })
    }
}

/// Number of nodes of each kind in a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeCounts {
    pub centers: usize,
    pub boundaries_2d: usize,
    pub boundaries_3d: usize,
    pub ground_edges: usize,
    pub ground_areas: usize,
}

impl NodeCounts {
    /// Returns the total number of nodes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.centers
            + self.boundaries_2d
            + self.boundaries_3d
            + self.ground_edges
            + self.ground_areas
    }

    pub(super) fn tally<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Self {
        nodes.into_iter().fold(Self::default(), |mut counts, node| {
            match node {
                Node::Center { .. } => counts.centers += 1,
                Node::Boundary2d { .. } => counts.boundaries_2d += 1,
                Node::Boundary3d { .. } => counts.boundaries_3d += 1,
                Node::GroundEdge { .. } => counts.ground_edges += 1,
                Node::GroundArea { .. } => counts.ground_areas += 1,
            }
            counts
        })
    }
}
