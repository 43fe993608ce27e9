use ndarray::Array2;

use crate::consts::MASK_MAX;
use crate::error::{Result, TempoError};
use crate::mask::Mask;
use crate::ops::{resize_array, ResizeKernel};

use super::motion::MotionField;
use super::{MaskExtractor, MaskKind, MaskParams};

/// Reference mask extractor: one value per block, upsampled to frame size.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockMaskExtractor;

/// Largest vector difference (pixels) to any 4-neighbor.
fn discontinuity(field: &MotionField, row: usize, col: usize) -> f32 {
    let (rows, cols) = field.grid_dim();
    let v = field.vectors[[row, col]];
    let mut worst = 0.0f32;
    let neighbors = [
        (row.wrapping_sub(1), col),
        (row + 1, col),
        (row, col.wrapping_sub(1)),
        (row, col + 1),
    ];
    for (r, c) in neighbors {
        if r < rows && c < cols {
            worst = worst.max(v.distance(&field.vectors[[r, c]]));
        }
    }
    worst
}

impl MaskExtractor for BlockMaskExtractor {
    fn extract_mask(&self, field: &MotionField, params: MaskParams) -> Result<Mask> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(params.scale) || !positive(params.gamma) {
            return Err(TempoError::Engine {
                stage: "Mask extraction",
                message: format!(
                    "scale and gamma must be positive (scale={}, gamma={})",
                    params.scale, params.gamma
                ),
            });
        }

        let (rows, cols) = field.grid_dim();
        let block_side = field.block.width.max(field.block.height) as f32;
        let grid = Array2::from_shape_fn((rows, cols), |(r, c)| {
            let level = match params.kind {
                // Residual in 8-bit levels per pixel.
                MaskKind::Sad => field.vectors[[r, c]].sad * MASK_MAX,
                // Discontinuity relative to the block size, on the same scale.
                MaskKind::Occlusion => discontinuity(field, r, c) / block_side * MASK_MAX,
            };
            let normalized = (level / params.scale).clamp(0.0, 1.0);
            MASK_MAX * normalized.powf(params.gamma)
        });

        let full = resize_array(&grid, field.height, field.width, ResizeKernel::Bilinear);
        Ok(Mask::new(full))
    }
}
