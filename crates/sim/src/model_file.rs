//! Model files: a stack of blocks that name their material.
//!
//! A TOML model file looks like
//!
//! ```toml
//! [materials."Thermal paste"]   # optional, extends the library
//! density = 2600.0
//! specific_heat = 700.0
//! conductivity = 8.5
//!
//! [[layers]]
//! [[layers.chiplets]]
//! [[layers.chiplets.blocks]]
//! material = "Si"
//! thickness = 0.0005
//! resolution = [2, 2]
//! left_x = 0.0
//! bottom_y = 0.0
//! width = 0.01
//! height = 0.01
//! power = 2.0          # or one value per phase: [2.0, 0.5]
//! ```
//!
//! JSON files use the same structure. Lengths are in meters and power in
//! watts.

use std::{fs, path::Path};

use ctm_core::model::{Block, BlockId, Chiplet, Layer, Model, Power, Resolution};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::materials::MaterialLibrary;

/// Errors that can occur while loading or resolving a model file.
#[derive(Debug, Error)]
pub enum ModelFileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML model: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported model file extension for {0} (expected .toml or .json)")]
    Extension(String),

    #[error("block {block:?} uses unknown material {name:?} (known: {known})")]
    UnknownMaterial {
        block: BlockId,
        name: String,
        known: String,
    },
}

/// A deserialized model file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelFile {
    /// Materials defined by the file, taking precedence over the library.
    #[serde(default)]
    pub materials: MaterialLibrary,

    /// Layers, bottom to top.
    pub layers: Vec<LayerSpec>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerSpec {
    pub chiplets: Vec<ChipletSpec>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChipletSpec {
    pub blocks: Vec<BlockSpec>,
}

/// A block whose thermal properties come from a named material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockSpec {
    pub material: String,
    pub thickness: f64,
    #[serde(default)]
    pub resolution: Resolution,
    pub left_x: f64,
    pub bottom_y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub power: Power,
}

impl ModelFile {
    /// Parses a TOML model file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelFileError::Toml`] if the text is not a valid model.
    pub fn from_toml_str(text: &str) -> Result<Self, ModelFileError> {
        Ok(toml::from_str(text)?)
    }

    /// Parses a JSON model file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelFileError::Json`] if the text is not a valid model.
    pub fn from_json_str(text: &str) -> Result<Self, ModelFileError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a model file, choosing the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelFileError`] if the file cannot be read, has an
    /// unsupported extension or does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelFileError> {
        let path = path.as_ref();
        let parse = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str,
            Some("json") => Self::from_json_str,
            _ => return Err(ModelFileError::Extension(path.display().to_string())),
        };
        let text = fs::read_to_string(path).map_err(|source| ModelFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        parse(&text)
    }

    /// Resolves every block's material, producing the solver input model.
    ///
    /// Materials defined in the file shadow same-named ones in `library`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelFileError::UnknownMaterial`] for the first block whose
    /// material is defined nowhere.
    pub fn to_model(&self, library: &MaterialLibrary) -> Result<Model<Block>, ModelFileError> {
        let mut materials = library.clone();
        materials.extend(&self.materials);

        let mut layers = Vec::with_capacity(self.layers.len());
        for (l, layer) in self.layers.iter().enumerate() {
            let mut chiplets = Vec::with_capacity(layer.chiplets.len());
            for (c, chiplet) in layer.chiplets.iter().enumerate() {
                let blocks = chiplet
                    .blocks
                    .iter()
                    .enumerate()
                    .map(|(b, spec)| spec.resolve(&materials, BlockId::new(l, c, b)))
                    .collect::<Result<Vec<_>, _>>()?;
                chiplets.push(Chiplet::new(blocks));
            }
            layers.push(Layer::new(chiplets));
        }

        Ok(Model::new(layers))
    }
}

impl BlockSpec {
    fn resolve(&self, materials: &MaterialLibrary, id: BlockId) -> Result<Block, ModelFileError> {
        let material =
            materials
                .get(&self.material)
                .ok_or_else(|| ModelFileError::UnknownMaterial {
                    block: id,
                    name: self.material.clone(),
                    known: known_names(materials),
                })?;

        Ok(Block {
            volumetric_heat_capacity: material.volumetric_heat_capacity(),
            conductivity: material.conductivity_si(),
            thickness: self.thickness,
            resolution: self.resolution,
            left_x: self.left_x,
            bottom_y: self.bottom_y,
            width: self.width,
            height: self.height,
            power: self.power.clone(),
        })
    }
}

fn known_names(materials: &MaterialLibrary) -> String {
    if materials.is_empty() {
        return "none".to_owned();
    }
    materials.names().collect::<Vec<_>>().join(", ")
}
