//! Node graph of a flattened model.
//!
//! The graph decides which rows the MNA system has. Every unit gets a
//! [`Node::Center`], followed by a [`Node::GroundEdge`] for each lateral border
//! no other unit of its chiplet reaches past, and a [`Node::GroundArea`] for
//! each face with uncovered area. Once all units are emitted, one
//! [`Node::Boundary2d`] is added per adjacent pair within a chiplet and one
//! [`Node::Boundary3d`] per superposed pair across adjacent layers.
//!
//! Node order is deterministic and defines the matrix index space:
//!
//! 1. Unit nodes in layer, chiplet, unit order. Per unit: center, edge grounds
//!    (north, east, south, west), then area grounds (bottom, top).
//! 2. 2D boundaries by layer, chiplet, first unit, second unit.
//! 3. 3D boundaries by lower layer, upper chiplet, lower chiplet, upper unit,
//!    lower unit.

mod node;

use std::collections::HashMap;

use crate::{
    geometry::{
        Adjacency, Border, Face, Footprint, NO_CONDUCTION, REL_TOLERANCE, Rect, adjacency,
        approx_eq, resistance_2d, resistance_3d, shared_area_3d, superposed,
    },
    model::{FlatModel, Unit, UnitId},
};

pub use node::{Node, NodeCounts};

/// The ordered node set of a flattened model.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGraph {
    nodes: Vec<Node>,
    centers: HashMap<UnitId, usize>,
}

impl NodeGraph {
    /// Builds the node graph of `model`.
    ///
    /// The adjacency and superposition scans are brute force over unit pairs;
    /// only chiplet pairs whose bounding boxes overlap are scanned across
    /// layers.
    #[must_use]
    pub fn build(model: &FlatModel) -> Self {
        let bounds = chiplet_bounds(model);
        let mut nodes = Vec::new();
        let mut centers = HashMap::new();

        for (id, unit) in model.units() {
            let chiplet = &model.layers[id.layer].chiplets[id.chiplet].elements;

            let mut grounds: Vec<Node> = Border::ALL
                .into_iter()
                .filter(|&border| is_grounded(chiplet, unit, border))
                .map(|border| Node::GroundEdge { unit: id, border })
                .collect();

            for face in [Face::Bottom, Face::Top] {
                let area = exposed_area(model, &bounds, id, unit, face);
                if area > unit.area() * REL_TOLERANCE {
                    grounds.push(Node::GroundArea {
                        unit: id,
                        face,
                        area,
                    });
                }
            }

            let center = nodes.len();
            centers.insert(id, center);
            nodes.push(Node::Center {
                unit: id,
                grounds: (center + 1..=center + grounds.len()).collect(),
            });
            nodes.extend(grounds);
        }

        push_lateral_boundaries(model, &mut nodes);
        push_vertical_boundaries(model, &bounds, &mut nodes);

        let graph = Self { nodes, centers };
        let counts = graph.counts();
        log::debug!(
            "node graph: {} nodes ({} centers, {} 2D boundaries, {} 3D boundaries, \
             {} edge grounds, {} area grounds)",
            counts.total(),
            counts.centers,
            counts.boundaries_2d,
            counts.boundaries_3d,
            counts.ground_edges,
            counts.ground_areas,
        );
        graph
    }

    /// Returns all nodes in index order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Returns the number of nodes, which is the dimension of the system.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of nodes of each kind.
    #[must_use]
    pub fn counts(&self) -> NodeCounts {
        NodeCounts::tally(&self.nodes)
    }

    /// Returns the index of the center node of `unit`.
    #[must_use]
    pub fn center_index(&self, unit: UnitId) -> Option<usize> {
        self.centers.get(&unit).copied()
    }

    /// Iterates over center nodes as `(index, unit)`, in index order.
    pub fn centers(&self) -> impl Iterator<Item = (usize, UnitId)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_center())
            .filter_map(|(index, node)| Some((index, node.unit()?)))
    }

    /// Returns the indices of the ground nodes of `unit`.
    ///
    /// Returns an empty slice for an unknown unit.
    #[must_use]
    pub fn grounds(&self, unit: UnitId) -> &[usize] {
        match self.center_index(unit).and_then(|index| self.node(index)) {
            Some(Node::Center { grounds, .. }) => grounds,
            _ => &[],
        }
    }

    /// Returns the index of the 2D boundary node joining `a` and `b`, in
    /// either order.
    #[must_use]
    pub fn boundary_2d(&self, a: UnitId, b: UnitId) -> Option<usize> {
        self.nodes.iter().position(|node| {
            matches!(node, Node::Boundary2d { first, second }
                if (*first == a && *second == b) || (*first == b && *second == a))
        })
    }

    /// Returns the index of the 3D boundary node joining `top` and `bottom`.
    #[must_use]
    pub fn boundary_3d(&self, top: UnitId, bottom: UnitId) -> Option<usize> {
        self.nodes.iter().position(|node| {
            matches!(node, Node::Boundary3d { top: t, bottom: b } if *t == top && *b == bottom)
        })
    }

    /// Removes a boundary node, breaking the heat path it represents.
    ///
    /// Boundary nodes follow every unit node, so center and ground indices
    /// are unaffected; later boundary nodes shift down by one.
    /// Returns the removed node, or `None` if `index` is not a boundary node.
    pub fn remove_boundary(&mut self, index: usize) -> Option<Node> {
        if self.nodes.get(index).is_some_and(Node::is_boundary) {
            Some(self.nodes.remove(index))
        } else {
            None
        }
    }

    /// Returns the center-to-center lateral resistance between `a` and `b`.
    ///
    /// Returns [`NO_CONDUCTION`] unless a 2D boundary node joins them.
    #[must_use]
    pub fn lateral_resistance(&self, model: &FlatModel, a: UnitId, b: UnitId) -> f64 {
        if self.boundary_2d(a, b).is_none() {
            return NO_CONDUCTION;
        }
        match (model.unit(a), model.unit(b)) {
            (Some(a), Some(b)) => resistance_2d(a, b).unwrap_or(NO_CONDUCTION),
            _ => NO_CONDUCTION,
        }
    }

    /// Returns the center-to-center vertical resistance between `top` and
    /// `bottom`.
    ///
    /// Returns [`NO_CONDUCTION`] unless a 3D boundary node joins them.
    #[must_use]
    pub fn vertical_resistance(&self, model: &FlatModel, top: UnitId, bottom: UnitId) -> f64 {
        if self.boundary_3d(top, bottom).is_none() {
            return NO_CONDUCTION;
        }
        match (model.unit(top), model.unit(bottom)) {
            (Some(top), Some(bottom)) => resistance_3d(top, bottom).unwrap_or(NO_CONDUCTION),
            _ => NO_CONDUCTION,
        }
    }
}

/// Bounding box of every chiplet, indexed by layer then chiplet.
type ChipletBounds = Vec<Vec<Option<Footprint>>>;

fn chiplet_bounds(model: &FlatModel) -> ChipletBounds {
    model
        .layers
        .iter()
        .map(|layer| {
            layer
                .chiplets
                .iter()
                .map(|chiplet| Footprint::bounding(&chiplet.elements))
                .collect()
        })
        .collect()
}

fn chiplets_superposed(a: Option<Footprint>, b: Option<Footprint>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => superposed(&a, &b),
        _ => false,
    }
}

/// A border is grounded when no unit of the chiplet reaches past it.
fn is_grounded(chiplet: &[Unit], unit: &Unit, border: Border) -> bool {
    chiplet
        .iter()
        .all(|other| !reaches_past(other, unit, border))
}

fn reaches_past(other: &Unit, unit: &Unit, border: Border) -> bool {
    let (theirs, mine) = match border {
        Border::North => (other.top_y(), unit.top_y()),
        Border::East => (other.right_x(), unit.right_x()),
        Border::South => (-other.bottom_y(), -unit.bottom_y()),
        Border::West => (-other.left_x(), -unit.left_x()),
    };
    theirs > mine && !approx_eq(theirs, mine)
}

/// Returns the area of `face` not covered by units of the neighboring layer.
///
/// The bottom face of the first layer and the top face of the last layer
/// are fully exposed.
fn exposed_area(
    model: &FlatModel,
    bounds: &ChipletBounds,
    id: UnitId,
    unit: &Unit,
    face: Face,
) -> f64 {
    let neighbor = match face {
        Face::Bottom => id.layer.checked_sub(1),
        Face::Top => Some(id.layer + 1).filter(|&layer| layer < model.layer_count()),
    };
    let Some(neighbor) = neighbor else {
        return unit.area();
    };

    let own = bounds[id.layer][id.chiplet];
    let covered: f64 = model.layers[neighbor]
        .chiplets
        .iter()
        .zip(&bounds[neighbor])
        .filter(|&(_, &other)| chiplets_superposed(own, other))
        .flat_map(|(chiplet, _)| &chiplet.elements)
        .filter_map(|other| shared_area_3d(unit, other).ok())
        .sum();

    unit.area() - covered
}

fn push_lateral_boundaries(model: &FlatModel, nodes: &mut Vec<Node>) {
    for (l, layer) in model.layers.iter().enumerate() {
        for (c, chiplet) in layer.chiplets.iter().enumerate() {
            let units = &chiplet.elements;
            for (i, first) in units.iter().enumerate() {
                for (j, second) in units.iter().enumerate().skip(i + 1) {
                    if adjacency(first, second) != Adjacency::None {
                        nodes.push(Node::Boundary2d {
                            first: UnitId::new(l, c, i),
                            second: UnitId::new(l, c, j),
                        });
                    }
                }
            }
        }
    }
}

fn push_vertical_boundaries(model: &FlatModel, bounds: &ChipletBounds, nodes: &mut Vec<Node>) {
    for lower in 0..model.layer_count().saturating_sub(1) {
        let upper = lower + 1;
        for (i, top_chiplet) in model.layers[upper].chiplets.iter().enumerate() {
            for (j, bottom_chiplet) in model.layers[lower].chiplets.iter().enumerate() {
                if !chiplets_superposed(bounds[upper][i], bounds[lower][j]) {
                    continue;
                }
                for (a, top) in top_chiplet.elements.iter().enumerate() {
                    for (b, bottom) in bottom_chiplet.elements.iter().enumerate() {
                        if superposed(top, bottom) {
                            nodes.push(Node::Boundary3d {
                                top: UnitId::new(upper, i, a),
                                bottom: UnitId::new(lower, j, b),
                            });
                        }
                    }
                }
            }
        }
    }
}
