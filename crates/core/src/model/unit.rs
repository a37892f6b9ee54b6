use crate::geometry::Rect;

use super::Power;

/// A discretized rectangular thermal element produced by the flattener.
///
/// Carries the material and geometry of its originating [`Block`] cell and a
/// back-reference to that block for result aggregation.
///
/// [`Block`]: super::Block
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub volumetric_heat_capacity: f64,
    pub conductivity: f64,
    pub thickness: f64,
    pub left_x: f64,
    pub bottom_y: f64,
    pub width: f64,
    pub height: f64,
    pub power: Power,
    pub origin: BlockId,
}

/// Position of a block in the input model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockId {
    pub layer: usize,
    pub chiplet: usize,
    pub block: usize,
}

/// Position of a unit in the flattened model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId {
    pub layer: usize,
    pub chiplet: usize,
    pub unit: usize,
}

impl BlockId {
    #[must_use]
    pub const fn new(layer: usize, chiplet: usize, block: usize) -> Self {
        Self {
            layer,
            chiplet,
            block,
        }
    }
}

impl UnitId {
    #[must_use]
    pub const fn new(layer: usize, chiplet: usize, unit: usize) -> Self {
        Self {
            layer,
            chiplet,
            unit,
        }
    }
}

impl Unit {
    /// Returns the lumped heat capacity `c·t·w·h`, in J/K.
    #[must_use]
    pub fn capacitance(&self) -> f64 {
        self.volumetric_heat_capacity * self.thickness * self.height * self.width
    }
}

impl Rect for Unit {
    fn left_x(&self) -> f64 {
        self.left_x
    }

    fn bottom_y(&self) -> f64 {
        self.bottom_y
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }
}
