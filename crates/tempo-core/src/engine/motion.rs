use ndarray::Array2;

use crate::params::BlockGeometry;

use super::SearchMode;

/// Which way a field's vectors point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Blocks of the earlier frame, pointing into the later one.
    Forward,
    /// Blocks of the later frame, pointing into the earlier one.
    Backward,
}

/// Displacement of one block, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionVector {
    pub dx: f32,
    pub dy: f32,
    /// Mean absolute difference of the match, in [0, 1] per pixel.
    pub sad: f32,
}

impl MotionVector {
    pub fn new(dx: f32, dy: f32, sad: f32) -> Self {
        Self { dx, dy, sad }
    }

    /// Euclidean distance between the displacements of two vectors.
    pub fn distance(&self, other: &MotionVector) -> f32 {
        let dx = self.dx - other.dx;
        let dy = self.dy - other.dy;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Per-block motion vectors for one frame pair.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionField {
    pub vectors: Array2<MotionVector>,
    pub block: BlockGeometry,
    pub direction: Direction,
    pub search: SearchMode,
    /// Frame width in pixels.
    pub width: usize,
    /// Frame height in pixels.
    pub height: usize,
}

impl MotionField {
    /// A zero-motion field covering a `height x width` frame.
    pub fn zeros(
        height: usize,
        width: usize,
        block: BlockGeometry,
        direction: Direction,
        search: SearchMode,
    ) -> Self {
        let (rows, cols) = block.grid_dim(height, width);
        Self {
            vectors: Array2::from_elem((rows, cols), MotionVector::default()),
            block,
            direction,
            search,
            width,
            height,
        }
    }

    /// Block-grid dimensions `(rows, cols)`.
    pub fn grid_dim(&self) -> (usize, usize) {
        self.vectors.dim()
    }

    /// Bilinearly interpolate the vector at a pixel position from block centers.
    pub fn sample(&self, y: f32, x: f32) -> MotionVector {
        let (rows, cols) = self.grid_dim();
        let gy = (y + 0.5) / self.block.height as f32 - 0.5;
        let gx = (x + 0.5) / self.block.width as f32 - 0.5;

        let y0 = gy.floor().clamp(0.0, (rows - 1) as f32);
        let x0 = gx.floor().clamp(0.0, (cols - 1) as f32);
        let fy = (gy - y0).clamp(0.0, 1.0);
        let fx = (gx - x0).clamp(0.0, 1.0);
        let r0 = y0 as usize;
        let c0 = x0 as usize;
        let r1 = (r0 + 1).min(rows - 1);
        let c1 = (c0 + 1).min(cols - 1);

        let v00 = self.vectors[[r0, c0]];
        let v01 = self.vectors[[r0, c1]];
        let v10 = self.vectors[[r1, c0]];
        let v11 = self.vectors[[r1, c1]];

        let w00 = (1.0 - fx) * (1.0 - fy);
        let w01 = fx * (1.0 - fy);
        let w10 = (1.0 - fx) * fy;
        let w11 = fx * fy;

        MotionVector {
            dx: v00.dx * w00 + v01.dx * w01 + v10.dx * w10 + v11.dx * w11,
            dy: v00.dy * w00 + v01.dy * w01 + v10.dy * w10 + v11.dy * w11,
            sad: v00.sad * w00 + v01.sad * w01 + v10.sad * w10 + v11.sad * w11,
        }
    }
}
