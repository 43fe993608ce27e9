use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{BLOCK_SIZE_BUCKETS, SUPPORTED_BLOCK_SIDES};
use crate::error::ConfigError;

/// Size of a motion-estimation block in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockGeometry {
    pub width: usize,
    pub height: usize,
}

/// Snap one side to the nearest supported length; ties go to the larger.
fn snap_side(side: usize) -> usize {
    let mut best = SUPPORTED_BLOCK_SIDES[0];
    for &candidate in &SUPPORTED_BLOCK_SIDES {
        if side.abs_diff(candidate) <= side.abs_diff(best) {
            best = candidate;
        }
    }
    best
}

impl BlockGeometry {
    pub const fn square(side: usize) -> Self {
        Self {
            width: side,
            height: side,
        }
    }

    /// Clamp a requested size to the nearest engine-supported geometry.
    pub fn snapped(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidBlockSize { width, height });
        }
        Ok(Self {
            width: snap_side(width),
            height: snap_side(height),
        })
    }

    /// Default block for a source resolution, bucketed by height-equivalent.
    pub fn for_resolution(width: usize, height: usize) -> Self {
        let height_equivalent = height.max(width * 9 / 16);
        let side = BLOCK_SIZE_BUCKETS
            .iter()
            .find(|(max_height, _)| height_equivalent <= *max_height)
            .map(|&(_, side)| side)
            .unwrap_or(SUPPORTED_BLOCK_SIDES[SUPPORTED_BLOCK_SIDES.len() - 1]);
        Self::square(side)
    }

    /// The side the threshold bands are keyed on.
    pub fn max_side(&self) -> usize {
        self.width.max(self.height)
    }

    /// Half size, snapped. Equal to `self` at the minimum size.
    pub fn halved(&self) -> Self {
        Self {
            width: snap_side(self.width / 2),
            height: snap_side(self.height / 2),
        }
    }

    /// Double size, snapped. Equal to `self` at the maximum size.
    pub fn doubled(&self) -> Self {
        Self {
            width: snap_side(self.width * 2),
            height: snap_side(self.height * 2),
        }
    }

    /// Block-grid dimensions `(rows, cols)` covering an image.
    pub fn grid_dim(&self, height: usize, width: usize) -> (usize, usize) {
        (
            height.div_ceil(self.height).max(1),
            width.div_ceil(self.width).max(1),
        )
    }
}

impl fmt::Display for BlockGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
