//! Thermal resistances between units, and between units and ambient.
//!
//! All resistances are in K/W and follow `R = L / (k · A)`, where `L` is the
//! conduction length, `k` the conductivity and `A` the cross-section.

use crate::model::Unit;

use super::{GeometryError, adjacency, edge_length_for, shared_area_3d};

/// Resistance standing in for "no conduction path".
///
/// Large but finite, so a zero contact area never produces a division fault
/// and the assembled system stays solvable.
pub const NO_CONDUCTION: f64 = 1e100;

/// A lateral border of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum Border {
    North,
    East,
    South,
    West,
}

/// A horizontal face of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum Face {
    Bottom,
    Top,
}

impl Border {
    /// All borders, in node emission order.
    pub const ALL: [Border; 4] = [Border::North, Border::East, Border::South, Border::West];
}

/// Returns the resistance `length / (conductivity · area)`.
///
/// A zero (or numerically negative) `area` yields [`NO_CONDUCTION`].
#[must_use]
pub fn resistance(area: f64, conductivity: f64, length: f64) -> f64 {
    if area <= 0.0 {
        NO_CONDUCTION
    } else {
        length / (conductivity * area)
    }
}

/// Returns the resistance from the center of `unit` to the edge it shares
/// with `neighbor` on the same layer.
///
/// The conduction length is half the unit's width (neighbors along X) or
/// half its height (neighbors along Y); the cross-section is the shared edge
/// length times the unit's thickness.
///
/// # Errors
///
/// Returns [`GeometryError::NotAdjacent`] if the units do not touch.
pub fn half_resistance_2d(unit: &Unit, neighbor: &Unit) -> Result<f64, GeometryError> {
    let relation = adjacency(unit, neighbor);
    let contact = edge_length_for(relation, unit, neighbor)? * unit.thickness;
    let length = if relation.is_horizontal() {
        unit.width / 2.0
    } else {
        unit.height / 2.0
    };
    Ok(resistance(contact, unit.conductivity, length))
}

/// Returns the center-to-center resistance between two adjacent units.
///
/// # Errors
///
/// Returns [`GeometryError::NotAdjacent`] if the units do not touch.
pub fn resistance_2d(a: &Unit, b: &Unit) -> Result<f64, GeometryError> {
    Ok(half_resistance_2d(a, b)? + half_resistance_2d(b, a)?)
}

/// Returns the resistance from the center of `unit` to the area it shares
/// with `other` on an adjacent layer.
///
/// The conduction length is half the unit's thickness.
///
/// # Errors
///
/// Returns [`GeometryError::NotSuperposed`] if the footprints do not overlap.
pub fn half_resistance_3d(unit: &Unit, other: &Unit) -> Result<f64, GeometryError> {
    let area = shared_area_3d(unit, other)?;
    Ok(resistance(area, unit.conductivity, unit.thickness / 2.0))
}

/// Returns the center-to-center resistance between two superposed units.
///
/// # Errors
///
/// Returns [`GeometryError::NotSuperposed`] if the footprints do not overlap.
pub fn resistance_3d(a: &Unit, b: &Unit) -> Result<f64, GeometryError> {
    Ok(half_resistance_3d(a, b)? + half_resistance_3d(b, a)?)
}

/// Returns the resistance from the center of `unit` to an exposed border.
#[must_use]
pub fn edge_resistance(unit: &Unit, border: Border) -> f64 {
    match border {
        Border::North | Border::South => resistance(
            unit.thickness * unit.width,
            unit.conductivity,
            unit.height / 2.0,
        ),
        Border::East | Border::West => resistance(
            unit.thickness * unit.height,
            unit.conductivity,
            unit.width / 2.0,
        ),
    }
}

/// Returns the resistance from the center of `unit` to `exposed_area` of its
/// top or bottom face.
#[must_use]
pub fn face_resistance(unit: &Unit, exposed_area: f64) -> f64 {
    resistance(exposed_area, unit.conductivity, unit.thickness / 2.0)
}
