//! Modified nodal analysis: assembles `G`, `C` and the excitation vectors.
//!
//! Potentials are temperature rises above ambient, so ambient is the
//! implicit reference node and never gets a row. Stamps take `Option<usize>`
//! terminals where `None` is ambient.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::{
    geometry::{
        Face, GeometryError, Rect, edge_resistance, face_resistance, half_resistance_2d,
        half_resistance_3d,
    },
    graph::{Node, NodeGraph},
    model::{FlatModel, Unit, UnitId},
};

/// Default convective heat transfer coefficient at the top of the stack,
/// in W/(m²·K).
pub const DEFAULT_CONVECTION_COEFFICIENT: f64 = 1200.0;

/// Conductance and capacitance matrices of a node graph.
#[derive(Debug, Clone, PartialEq)]
pub struct MnaSystem {
    g: DMatrix<f64>,
    c: DMatrix<f64>,
}

/// Errors that can occur while assembling the system matrices.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    #[error("node graph references unit {0:?}, which is not in the model")]
    UnknownUnit(UnitId),

    #[error("invalid convection coefficient: {0}")]
    Convection(f64),

    #[error("G is {g:?} and C is {c:?}; both must be square and the same size")]
    Shape { g: (usize, usize), c: (usize, usize) },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Errors that can occur while building excitation vectors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExcitationError {
    #[error("unit {unit:?} defines {found} power phases, but the schedule has {expected}")]
    LengthMismatch {
        unit: UnitId,
        expected: usize,
        found: usize,
    },

    #[error("node graph references unit {0:?}, which is not in the model")]
    UnknownUnit(UnitId),
}

impl MnaSystem {
    /// Wraps precomputed conductance and capacitance matrices.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Shape`] unless both matrices are square and
    /// of the same dimension.
    pub fn from_matrices(g: DMatrix<f64>, c: DMatrix<f64>) -> Result<Self, AssemblyError> {
        if !g.is_square() || g.shape() != c.shape() {
            return Err(AssemblyError::Shape {
                g: g.shape(),
                c: c.shape(),
            });
        }
        Ok(Self { g, c })
    }

    /// Returns the conductance matrix `G`, in W/K.
    #[must_use]
    pub fn conductance(&self) -> &DMatrix<f64> {
        &self.g
    }

    /// Returns the diagonal capacitance matrix `C`, in J/K.
    #[must_use]
    pub fn capacitance(&self) -> &DMatrix<f64> {
        &self.c
    }

    /// Returns the dimension of the system.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.g.nrows()
    }
}

/// Assembles `G` and `C` for `graph`.
///
/// Boundary nodes are junctions: each unit's half-resistance is stamped
/// between its center and the boundary node, so the two halves add up to the
/// center-to-center resistance. Edge grounds are pinned to ambient: the
/// center sees a conductance to ambient and the edge row is the identity.
/// Area grounds hang off their center, and the top area of the last layer
/// also loses heat by convection with `convection_coefficient` over the full
/// unit area.
///
/// # Errors
///
/// Returns an [`AssemblyError`] if a node references a unit missing from
/// `model`, a boundary node joins units that do not touch, or the convection
/// coefficient is negative or not finite.
pub fn assemble(
    model: &FlatModel,
    graph: &NodeGraph,
    convection_coefficient: f64,
) -> Result<MnaSystem, AssemblyError> {
    if !convection_coefficient.is_finite() || convection_coefficient < 0.0 {
        return Err(AssemblyError::Convection(convection_coefficient));
    }

    let n = graph.len();
    let mut g = DMatrix::zeros(n, n);
    let mut c = DMatrix::zeros(n, n);
    let top_layer = model.layer_count().saturating_sub(1);

    for (index, node) in graph.nodes().iter().enumerate() {
        match *node {
            Node::Center { unit: id, .. } => {
                c[(index, index)] += unit(model, id)?.capacitance();
            }
            Node::GroundEdge { unit: id, border } => {
                let center = center(graph, id)?;
                let r = edge_resistance(unit(model, id)?, border);
                stamp_conductance(&mut g, Some(center), None, 1.0 / r);
                pin(&mut g, index);
            }
            Node::GroundArea {
                unit: id,
                face,
                area,
            } => {
                let u = unit(model, id)?;
                let center = center(graph, id)?;
                let conductance = 1.0 / face_resistance(u, area);
                stamp_conductance(&mut g, Some(center), Some(index), conductance);
                if face == Face::Top && id.layer == top_layer {
                    stamp_conductance(&mut g, Some(index), None, convection_coefficient * u.area());
                }
            }
            Node::Boundary2d { first, second } => {
                let (a, b) = (unit(model, first)?, unit(model, second)?);
                let r_a = half_resistance_2d(a, b)?;
                let r_b = half_resistance_2d(b, a)?;
                stamp_conductance(&mut g, Some(center(graph, first)?), Some(index), 1.0 / r_a);
                stamp_conductance(&mut g, Some(center(graph, second)?), Some(index), 1.0 / r_b);
            }
            Node::Boundary3d { top, bottom } => {
                let (a, b) = (unit(model, top)?, unit(model, bottom)?);
                let r_top = half_resistance_3d(a, b)?;
                let r_bottom = half_resistance_3d(b, a)?;
                let (top, bottom) = (center(graph, top)?, center(graph, bottom)?);
                stamp_conductance(&mut g, Some(top), Some(index), 1.0 / r_top);
                stamp_conductance(&mut g, Some(bottom), Some(index), 1.0 / r_bottom);
            }
        }
    }

    log::debug!("assembled {n}x{n} conductance and capacitance matrices");
    Ok(MnaSystem { g, c })
}

/// Stamps a conductance `g` between terminals `a` and `b`.
///
/// A `None` terminal is ambient, so only the other diagonal entry changes.
pub fn stamp_conductance(matrix: &mut DMatrix<f64>, a: Option<usize>, b: Option<usize>, g: f64) {
    if let Some(i) = a {
        matrix[(i, i)] += g;
    }
    if let Some(j) = b {
        matrix[(j, j)] += g;
    }
    if let (Some(i), Some(j)) = (a, b) {
        matrix[(i, j)] -= g;
        matrix[(j, i)] -= g;
    }
}

/// Fixes a node at ambient potential by making its row the identity.
fn pin(matrix: &mut DMatrix<f64>, index: usize) {
    matrix[(index, index)] = 1.0;
}

/// Returns the excitation for a steady-state solve.
///
/// Each center node carries its unit's steady power; every other entry is 0.
///
/// # Errors
///
/// Returns [`ExcitationError::UnknownUnit`] if `graph` does not match `model`.
pub fn steady_excitation(
    model: &FlatModel,
    graph: &NodeGraph,
) -> Result<DVector<f64>, ExcitationError> {
    let mut i = DVector::zeros(graph.len());
    for (index, id) in graph.centers() {
        let unit = model.unit(id).ok_or(ExcitationError::UnknownUnit(id))?;
        i[index] = unit.power.steady();
    }
    Ok(i)
}

/// Returns one excitation vector per transient phase.
///
/// A constant power applies to every phase; a phased power must define
/// exactly `phases` values.
///
/// # Errors
///
/// Returns [`ExcitationError::LengthMismatch`] for the first unit whose power
/// sequence does not match the schedule.
pub fn phase_excitations(
    model: &FlatModel,
    graph: &NodeGraph,
    phases: usize,
) -> Result<Vec<DVector<f64>>, ExcitationError> {
    let mut vectors = vec![DVector::zeros(graph.len()); phases];

    for (index, id) in graph.centers() {
        let unit = model.unit(id).ok_or(ExcitationError::UnknownUnit(id))?;
        if let Some(found) = unit.power.phase_count() {
            if found != phases {
                return Err(ExcitationError::LengthMismatch {
                    unit: id,
                    expected: phases,
                    found,
                });
            }
        }
        for (phase, vector) in vectors.iter_mut().enumerate() {
            vector[index] = unit.power.at_phase(phase).unwrap_or(0.0);
        }
    }

    Ok(vectors)
}

fn unit(model: &FlatModel, id: UnitId) -> Result<&Unit, AssemblyError> {
    model.unit(id).ok_or(AssemblyError::UnknownUnit(id))
}

fn center(graph: &NodeGraph, id: UnitId) -> Result<usize, AssemblyError> {
    graph.center_index(id).ok_or(AssemblyError::UnknownUnit(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{
        geometry::Border,
        model::{BlockId, Model, Power},
    };

    // --- Test fixtures ---

    fn unit_at(left_x: f64, bottom_y: f64, power: Power) -> Unit {
        Unit {
            volumetric_heat_capacity: 1.6e6,
            conductivity: 100.0,
            thickness: 0.001,
            left_x,
            bottom_y,
            width: 0.01,
            height: 0.01,
            power,
            origin: BlockId::new(0, 0, 0),
        }
    }

    /// Two layers: a 2x1 row below and a single unit on the left above.
    fn stack() -> FlatModel {
        Model::from_nested(vec![
            vec![vec![
                unit_at(0.0, 0.0, Power::Constant(1.0)),
                unit_at(0.01, 0.0, Power::Constant(0.0)),
            ]],
            vec![vec![unit_at(0.0, 0.0, Power::Phased(vec![2.0, 0.5]))]],
        ])
    }

    // --- Tests ---

    #[test]
    fn conductance_matrix_is_symmetric_with_nonnegative_row_sums() {
        let model = stack();
        let graph = NodeGraph::build(&model);

        let system = assemble(&model, &graph, DEFAULT_CONVECTION_COEFFICIENT).unwrap();
        let g = system.conductance();

        assert_eq!(system.dim(), graph.len());
        for i in 0..g.nrows() {
            for j in 0..g.ncols() {
                assert_relative_eq!(g[(i, j)], g[(j, i)]);
            }
            assert!(g.row(i).sum() >= -1e-12, "row {i} sums below zero");
        }
    }

    #[test]
    fn only_centers_carry_capacitance() {
        let model = stack();
        let graph = NodeGraph::build(&model);

        let system = assemble(&model, &graph, DEFAULT_CONVECTION_COEFFICIENT).unwrap();
        let c = system.capacitance();

        let expected = 1.6e6 * 0.001 * 0.01 * 0.01;
        for (index, node) in graph.nodes().iter().enumerate() {
            let value = c[(index, index)];
            if node.is_center() {
                assert_relative_eq!(value, expected);
            } else {
                assert_eq!(value, 0.0);
            }
        }
        assert_relative_eq!(c.sum(), 3.0 * expected);
    }

    #[test]
    fn edge_grounds_are_pinned() {
        let model = stack();
        let graph = NodeGraph::build(&model);

        let system = assemble(&model, &graph, DEFAULT_CONVECTION_COEFFICIENT).unwrap();
        let g = system.conductance();

        for (index, node) in graph.nodes().iter().enumerate() {
            if let Node::GroundEdge { .. } = node {
                assert_eq!(g[(index, index)], 1.0);
                assert_eq!(g.row(index).sum(), 1.0);
            }
        }
    }

    #[test]
    fn isolated_unit_stamps_match_resistances() {
        let model = Model::from_nested(vec![vec![vec![unit_at(0.0, 0.0, Power::Constant(1.0))]]]);
        let graph = NodeGraph::build(&model);
        let u = model.unit(UnitId::new(0, 0, 0)).unwrap();

        let system = assemble(&model, &graph, 1000.0).unwrap();
        let g = system.conductance();

        let lateral: f64 = Border::ALL
            .iter()
            .map(|&border| 1.0 / edge_resistance(u, border))
            .sum();
        let face = 1.0 / face_resistance(u, u.area());

        // Center: four edges to ambient plus both area nodes.
        assert_relative_eq!(g[(0, 0)], lateral + 2.0 * face);
        // Bottom area (index 5) floats; top area (index 6) also convects.
        assert_relative_eq!(g[(5, 5)], face);
        assert_relative_eq!(g[(6, 6)], face + 1000.0 * u.area());
        assert_relative_eq!(g[(0, 6)], -face);
    }

    #[test]
    fn negative_convection_is_rejected() {
        let model = stack();
        let graph = NodeGraph::build(&model);

        assert_eq!(
            assemble(&model, &graph, -1.0),
            Err(AssemblyError::Convection(-1.0))
        );
    }

    #[test]
    fn steady_excitation_uses_first_phase() {
        let model = stack();
        let graph = NodeGraph::build(&model);

        let i = steady_excitation(&model, &graph).unwrap();

        let lower = graph.center_index(UnitId::new(0, 0, 0)).unwrap();
        let upper = graph.center_index(UnitId::new(1, 0, 0)).unwrap();
        assert_eq!(i[lower], 1.0);
        assert_eq!(i[upper], 2.0);
        assert_relative_eq!(i.sum(), 3.0);
    }

    #[test]
    fn phase_excitations_follow_the_schedule() {
        let model = stack();
        let graph = NodeGraph::build(&model);

        let vectors = phase_excitations(&model, &graph, 2).unwrap();

        let lower = graph.center_index(UnitId::new(0, 0, 0)).unwrap();
        let upper = graph.center_index(UnitId::new(1, 0, 0)).unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0][lower], 1.0);
        assert_eq!(vectors[1][lower], 1.0);
        assert_eq!(vectors[0][upper], 2.0);
        assert_eq!(vectors[1][upper], 0.5);
    }

    #[test]
    fn phase_count_mismatch_is_rejected() {
        let model = stack();
        let graph = NodeGraph::build(&model);

        let err = phase_excitations(&model, &graph, 3).unwrap_err();

        assert_eq!(
            err,
            ExcitationError::LengthMismatch {
                unit: UnitId::new(1, 0, 0),
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn graph_from_another_model_is_rejected() {
        let model = stack();
        let graph = NodeGraph::build(&model);
        let smaller = Model::from_nested(vec![vec![vec![unit_at(0.0, 0.0, Power::default())]]]);

        assert!(matches!(
            assemble(&smaller, &graph, DEFAULT_CONVECTION_COEFFICIENT),
            Err(AssemblyError::UnknownUnit(_))
        ));
    }

    #[test]
    fn precomputed_matrices_must_agree_in_shape() {
        let ok = MnaSystem::from_matrices(DMatrix::identity(2, 2), DMatrix::zeros(2, 2));
        let bad = MnaSystem::from_matrices(DMatrix::identity(2, 2), DMatrix::zeros(3, 3));

        assert_eq!(ok.unwrap().dim(), 2);
        assert_eq!(
            bad,
            Err(AssemblyError::Shape {
                g: (2, 2),
                c: (3, 3)
            })
        );
    }
}
