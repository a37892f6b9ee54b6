//! Stacked layer model.
//!
//! A [`Model`] is an ordered stack of [`Layer`]s (bottom to top), each layer
//! holding [`Chiplet`]s, each chiplet holding rectangular elements.
//! The same container describes the coarse input (`Model<Block>`) and the
//! discretized model produced by the flattener (`Model<Unit>`).

mod block;
mod power;
mod unit;

pub use block::{Block, Resolution};
pub use power::Power;
pub use unit::{BlockId, Unit, UnitId};

/// A flattened model: every element is a discretized [`Unit`].
pub type FlatModel = Model<Unit>;

/// An ordered stack of layers, bottom to top.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(transparent))]
pub struct Model<T> {
    pub layers: Vec<Layer<T>>,
}

/// An ordered set of chiplets sharing one vertical position in the stack.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(transparent))]
pub struct Layer<T> {
    pub chiplets: Vec<Chiplet<T>>,
}

/// A laterally contiguous group of elements.
///
/// Heat never flows laterally between two chiplets of the same layer.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(transparent))]
pub struct Chiplet<T> {
    pub elements: Vec<T>,
}

impl<T> Model<T> {
    #[must_use]
    pub fn new(layers: Vec<Layer<T>>) -> Self {
        Self { layers }
    }

    /// Builds a model from plain nested vectors (layer, chiplet, element).
    #[must_use]
    pub fn from_nested(layers: Vec<Vec<Vec<T>>>) -> Self {
        Self {
            layers: layers
                .into_iter()
                .map(|chiplets| Layer {
                    chiplets: chiplets.into_iter().map(Chiplet::new).collect(),
                })
                .collect(),
        }
    }

    /// Returns the element at the given layer, chiplet and element index.
    #[must_use]
    pub fn get(&self, layer: usize, chiplet: usize, element: usize) -> Option<&T> {
        self.layers
            .get(layer)?
            .chiplets
            .get(chiplet)?
            .elements
            .get(element)
    }

    /// Returns the number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Returns the total number of elements across all layers and chiplets.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|layer| &layer.chiplets)
            .map(|chiplet| chiplet.elements.len())
            .sum()
    }

    /// Iterates over every element with its `(layer, chiplet, element)` index,
    /// in stack order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize, usize), &T)> + '_ {
        self.layers.iter().enumerate().flat_map(|(l, layer)| {
            layer.chiplets.iter().enumerate().flat_map(move |(c, chiplet)| {
                chiplet
                    .elements
                    .iter()
                    .enumerate()
                    .map(move |(e, element)| ((l, c, e), element))
            })
        })
    }
}

impl FlatModel {
    /// Returns the unit with the given id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.get(id.layer, id.chiplet, id.unit)
    }

    /// Iterates over every unit with its [`UnitId`], in stack order.
    pub fn units(&self) -> impl Iterator<Item = (UnitId, &Unit)> + '_ {
        self.iter()
            .map(|((layer, chiplet, unit), u)| (UnitId::new(layer, chiplet, unit), u))
    }
}

impl<T> Layer<T> {
    #[must_use]
    pub fn new(chiplets: Vec<Chiplet<T>>) -> Self {
        Self { chiplets }
    }
}

impl<T> Chiplet<T> {
    #[must_use]
    pub fn new(elements: Vec<T>) -> Self {
        Self { elements }
    }
}
