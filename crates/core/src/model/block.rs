use crate::geometry::Rect;

use super::Power;

/// A coarse rectangular functional block, as laid out by a model author.
///
/// All quantities are SI: meters, W/(m·K), J/(m³·K) and watts.
/// The flattener subdivides each block into `nx × ny` [`Unit`]s according to
/// its [`Resolution`].
///
/// [`Unit`]: super::Unit
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub volumetric_heat_capacity: f64,
    pub conductivity: f64,
    pub thickness: f64,
    pub resolution: Resolution,
    pub left_x: f64,
    pub bottom_y: f64,
    pub width: f64,
    pub height: f64,
    #[cfg_attr(feature = "serde-derive", serde(default))]
    pub power: Power,
}

/// Number of subdivisions of a block along X (`nx`) and Y (`ny`).
///
/// Serialized as a two-element array `[nx, ny]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution(usize, usize);

impl Resolution {
    /// Creates a resolution.
    ///
    /// Zero components are accepted here and rejected by the flattener, so a
    /// model can be described before it is validated.
    #[must_use]
    pub const fn new(nx: usize, ny: usize) -> Self {
        Self(nx, ny)
    }

    #[must_use]
    pub const fn nx(self) -> usize {
        self.0
    }

    #[must_use]
    pub const fn ny(self) -> usize {
        self.1
    }

    /// Returns the number of cells, `nx × ny`.
    #[must_use]
    pub const fn cells(self) -> usize {
        self.0 * self.1
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self(1, 1)
    }
}

impl Rect for Block {
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
