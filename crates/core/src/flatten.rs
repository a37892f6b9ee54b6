//! Subdivides coarse blocks into a uniform grid of units.

use thiserror::Error;

use crate::{
    geometry,
    model::{Block, BlockId, Chiplet, FlatModel, Layer, Model, Unit},
};

/// Errors that can occur while flattening a block model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlattenError {
    #[error("block {block:?} has resolution {nx}x{ny}; both components must be positive")]
    Resolution {
        block: BlockId,
        nx: usize,
        ny: usize,
    },

    #[error("block {block:?} has invalid {property} ({value}); it must be finite and positive")]
    Property {
        block: BlockId,
        property: &'static str,
        value: f64,
    },

    #[error("block {block:?} has heat capacity {value}; it must be finite and positive")]
    Capacity { block: BlockId, value: f64 },

    #[error("blocks {first:?} and {second:?} overlap within the same chiplet")]
    Overlap { first: BlockId, second: BlockId },
}

/// Flattens a block model into a unit model.
///
/// Every block is replaced, in place, by its `nx × ny` units, so layers and
/// chiplets keep their indices and each unit remembers its block.
///
/// # Errors
///
/// Returns a [`FlattenError`] for the first block with a zero resolution
/// component, a non-positive dimension, conductivity or heat capacity, or for
/// the first pair of blocks that overlap within a chiplet.
pub fn flatten(model: &Model<Block>) -> Result<FlatModel, FlattenError> {
    let mut layers = Vec::with_capacity(model.layers.len());

    for (l, layer) in model.layers.iter().enumerate() {
        let mut chiplets = Vec::with_capacity(layer.chiplets.len());

        for (c, chiplet) in layer.chiplets.iter().enumerate() {
            check_overlaps(&chiplet.elements, l, c)?;

            let mut units = Vec::new();
            for (b, block) in chiplet.elements.iter().enumerate() {
                units.extend(subdivide(block, BlockId::new(l, c, b))?);
            }
            chiplets.push(Chiplet::new(units));
        }

        layers.push(Layer::new(chiplets));
    }

    let flat = Model::new(layers);
    log::debug!(
        "flattened {} blocks into {} units",
        model.element_count(),
        flat.element_count()
    );
    Ok(flat)
}

/// Splits one block into its grid of units.
///
/// Units are emitted row by row from the bottom, left to right within a row.
/// Each unit inherits the block's material and thickness and receives an
/// equal share of its power.
///
/// # Errors
///
/// Returns a [`FlattenError`] if the block cannot be subdivided.
pub fn subdivide(block: &Block, origin: BlockId) -> Result<Vec<Unit>, FlattenError> {
    validate(block, origin)?;

    let (nx, ny) = (block.resolution.nx(), block.resolution.ny());

    #[allow(clippy::cast_precision_loss)]
    let (width, height) = (block.width / nx as f64, block.height / ny as f64);
    let power = block.power.split(block.resolution.cells());

    let units = (0..ny)
        .flat_map(|row| (0..nx).map(move |col| (row, col)))
        .map(|(row, col)| {
            #[allow(clippy::cast_precision_loss)]
            let (row, col) = (row as f64, col as f64);
            Unit {
                volumetric_heat_capacity: block.volumetric_heat_capacity,
                conductivity: block.conductivity,
                thickness: block.thickness,
                left_x: block.left_x + width * col,
                bottom_y: block.bottom_y + height * row,
                width,
                height,
                power: power.clone(),
                origin,
            }
        })
        .collect();

    Ok(units)
}

fn validate(block: &Block, origin: BlockId) -> Result<(), FlattenError> {
    let (nx, ny) = (block.resolution.nx(), block.resolution.ny());
    if nx == 0 || ny == 0 {
        return Err(FlattenError::Resolution {
            block: origin,
            nx,
            ny,
        });
    }

    let properties = [
        ("width", block.width),
        ("height", block.height),
        ("thickness", block.thickness),
        ("conductivity", block.conductivity),
    ];
    for (property, value) in properties {
        if !value.is_finite() || value <= 0.0 {
            return Err(FlattenError::Property {
                block: origin,
                property,
                value,
            });
        }
    }

    let capacity = block.volumetric_heat_capacity;
    if !capacity.is_finite() || capacity <= 0.0 {
        return Err(FlattenError::Capacity {
            block: origin,
            value: capacity,
        });
    }

    Ok(())
}

/// Blocks of one chiplet may touch but must not share any area.
fn check_overlaps(blocks: &[Block], layer: usize, chiplet: usize) -> Result<(), FlattenError> {
    for (i, a) in blocks.iter().enumerate() {
        if let Some(j) = blocks[i + 1..]
            .iter()
            .position(|b| geometry::superposed(a, b))
        {
            return Err(FlattenError::Overlap {
                first: BlockId::new(layer, chiplet, i),
                second: BlockId::new(layer, chiplet, i + 1 + j),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{
        geometry::Rect,
        model::{Power, Resolution},
    };

    fn block(resolution: Resolution, power: Power) -> Block {
        Block {
            volumetric_heat_capacity: 1.6e6,
            conductivity: 125.0,
            thickness: 0.0005,
            resolution,
            left_x: 0.002,
            bottom_y: 0.001,
            width: 0.004,
            height: 0.003,
            power,
        }
    }

    #[test]
    fn unit_resolution_returns_the_block() {
        let b = block(Resolution::new(1, 1), Power::Constant(2.0));

        let units = subdivide(&b, BlockId::new(0, 0, 0)).unwrap();

        assert_eq!(units.len(), 1);
        let u = &units[0];
        assert_eq!(u.left_x, b.left_x);
        assert_eq!(u.bottom_y, b.bottom_y);
        assert_eq!(u.width, b.width);
        assert_eq!(u.height, b.height);
        assert_eq!(u.thickness, b.thickness);
        assert_eq!(u.power, b.power);
    }

    #[test]
    fn grid_is_row_major_from_bottom_left() {
        let b = block(Resolution::new(2, 3), Power::Constant(6.0));

        let units = subdivide(&b, BlockId::new(1, 2, 3)).unwrap();

        assert_eq!(units.len(), 6);
        assert_relative_eq!(units[0].left_x, 0.002);
        assert_relative_eq!(units[0].bottom_y, 0.001);
        assert_relative_eq!(units[1].left_x, 0.004);
        assert_relative_eq!(units[1].bottom_y, 0.001);
        assert_relative_eq!(units[2].left_x, 0.002);
        assert_relative_eq!(units[2].bottom_y, 0.002);
        assert_relative_eq!(units[5].right_x(), 0.006);
        assert_relative_eq!(units[5].top_y(), 0.004);
        for u in &units {
            assert_relative_eq!(u.width, 0.002);
            assert_relative_eq!(u.height, 0.001);
            assert_eq!(u.power, Power::Constant(1.0));
            assert_eq!(u.origin, BlockId::new(1, 2, 3));
        }
    }

    #[test]
    fn phased_power_is_split_per_phase() {
        let b = block(Resolution::new(2, 2), Power::Phased(vec![4.0, 8.0]));

        let units = subdivide(&b, BlockId::new(0, 0, 0)).unwrap();

        let total: f64 = units.iter().map(|u| u.power.at_phase(1).unwrap()).sum();
        assert_relative_eq!(total, 8.0);
        assert_eq!(units[3].power, Power::Phased(vec![1.0, 2.0]));
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let b = block(Resolution::new(0, 2), Power::default());

        let err = subdivide(&b, BlockId::new(0, 1, 0)).unwrap_err();

        assert_eq!(
            err,
            FlattenError::Resolution {
                block: BlockId::new(0, 1, 0),
                nx: 0,
                ny: 2
            }
        );
    }

    #[test]
    fn non_positive_thickness_is_rejected() {
        let mut b = block(Resolution::new(1, 1), Power::default());
        b.thickness = 0.0;

        let err = subdivide(&b, BlockId::new(0, 0, 0)).unwrap_err();

        assert!(matches!(
            err,
            FlattenError::Property {
                property: "thickness",
                ..
            }
        ));
    }

    #[test]
    fn flatten_keeps_layer_and_chiplet_structure() {
        let mut beside = block(Resolution::new(1, 2), Power::default());
        beside.bottom_y += beside.height;
        let model = Model::from_nested(vec![
            vec![
                vec![block(Resolution::new(2, 2), Power::default())],
                vec![block(Resolution::new(1, 1), Power::default())],
            ],
            vec![vec![block(Resolution::new(3, 1), Power::default()), beside]],
        ]);

        let flat = flatten(&model).unwrap();

        assert_eq!(flat.layer_count(), 2);
        assert_eq!(flat.layers[0].chiplets[0].elements.len(), 4);
        assert_eq!(flat.layers[0].chiplets[1].elements.len(), 1);
        assert_eq!(flat.layers[1].chiplets[0].elements.len(), 5);
        assert_eq!(
            flat.layers[1].chiplets[0].elements[4].origin,
            BlockId::new(1, 0, 1)
        );
    }

    #[test]
    fn non_positive_heat_capacity_is_rejected() {
        let mut b = block(Resolution::new(1, 1), Power::default());
        b.volumetric_heat_capacity = 0.0;

        let err = subdivide(&b, BlockId::new(0, 0, 2)).unwrap_err();

        assert_eq!(
            err,
            FlattenError::Capacity {
                block: BlockId::new(0, 0, 2),
                value: 0.0
            }
        );

        b.volumetric_heat_capacity = -1.0e6;
        assert!(matches!(
            subdivide(&b, BlockId::new(0, 0, 2)),
            Err(FlattenError::Capacity { .. })
        ));
    }

    #[test]
    fn overlapping_blocks_in_a_chiplet_are_rejected() {
        let first = block(Resolution::new(1, 1), Power::default());
        let mut second = first.clone();
        second.left_x += first.width / 2.0;
        let model = Model::from_nested(vec![vec![vec![first, second]]]);

        let err = flatten(&model).unwrap_err();

        assert_eq!(
            err,
            FlattenError::Overlap {
                first: BlockId::new(0, 0, 0),
                second: BlockId::new(0, 0, 1)
            }
        );
    }

    #[test]
    fn touching_blocks_and_separate_chiplets_may_share_area() {
        let first = block(Resolution::new(2, 1), Power::default());
        let mut touching = first.clone();
        touching.left_x += first.width;
        let model = Model::from_nested(vec![vec![
            vec![first.clone(), touching],
            vec![first],
        ]]);

        let flat = flatten(&model).unwrap();

        assert_eq!(flat.element_count(), 6);
    }
}
