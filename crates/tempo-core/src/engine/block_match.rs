//! Full-search block matching.

use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::{PARALLEL_PIXEL_THRESHOLD, REFINE_SEARCH_RADIUS, ZERO_VECTOR_BIAS};
use crate::error::{Result, TempoError};
use crate::frame::Frame;
use crate::ops::ensure_same_dim;
use crate::params::BlockGeometry;

use super::motion::{Direction, MotionField, MotionVector};
use super::{MotionEngine, SearchMode};

/// Reference motion engine: exhaustive integer-pel search in a square window.
#[derive(Clone, Debug)]
pub struct BlockMatchEngine {
    search_radius: usize,
}

impl BlockMatchEngine {
    pub fn new(search_radius: usize) -> Self {
        Self { search_radius }
    }
}

/// Pixel rectangle of one block, clipped to the frame.
#[derive(Clone, Copy)]
struct BlockRect {
    y0: usize,
    x0: usize,
    y1: usize,
    x1: usize,
}

impl BlockRect {
    fn new(row: usize, col: usize, block: BlockGeometry, h: usize, w: usize) -> Self {
        let y0 = row * block.height;
        let x0 = col * block.width;
        Self {
            y0,
            x0,
            y1: (y0 + block.height).min(h),
            x1: (x0 + block.width).min(w),
        }
    }

    fn area(&self) -> f32 {
        ((self.y1 - self.y0) * (self.x1 - self.x0)).max(1) as f32
    }

    fn center(&self) -> (f32, f32) {
        (
            (self.y0 + self.y1) as f32 / 2.0 - 0.5,
            (self.x0 + self.x1) as f32 / 2.0 - 0.5,
        )
    }
}

/// Reference pixel at an integer displacement, edges replicated.
fn shifted(reference: &Array2<f32>, y: usize, x: usize, dy: isize, dx: isize) -> f32 {
    let (h, w) = reference.dim();
    let ry = (y as isize + dy).clamp(0, h as isize - 1) as usize;
    let rx = (x as isize + dx).clamp(0, w as isize - 1) as usize;
    reference[[ry, rx]]
}

fn block_mean(data: &Array2<f32>, rect: BlockRect, dy: isize, dx: isize) -> f32 {
    let mut sum = 0.0f32;
    for y in rect.y0..rect.y1 {
        for x in rect.x0..rect.x1 {
            sum += shifted(data, y, x, dy, dx);
        }
    }
    sum / rect.area()
}

/// Mean absolute difference of the block against the displaced reference.
fn block_cost(
    current: &Array2<f32>,
    reference: &Array2<f32>,
    rect: BlockRect,
    dy: isize,
    dx: isize,
    mode: SearchMode,
) -> f32 {
    let (cur_dc, ref_dc) = match mode {
        SearchMode::Sad => (0.0, 0.0),
        SearchMode::Dct => (
            block_mean(current, rect, 0, 0),
            block_mean(reference, rect, dy, dx),
        ),
    };
    let mut sum = 0.0f32;
    for y in rect.y0..rect.y1 {
        for x in rect.x0..rect.x1 {
            let c = current[[y, x]] - cur_dc;
            let r = shifted(reference, y, x, dy, dx) - ref_dc;
            sum += (c - r).abs();
        }
    }
    sum / rect.area()
}

/// Search a window around `(seed_dy, seed_dx)` and return the best vector.
///
/// Candidates other than the zero vector pay a small bias so flat areas keep
/// zero motion.
fn search_block(
    current: &Array2<f32>,
    reference: &Array2<f32>,
    rect: BlockRect,
    seed: (isize, isize),
    radius: isize,
    mode: SearchMode,
) -> MotionVector {
    let mut best = (0isize, 0isize);
    let mut best_cost = f32::INFINITY;

    for dy in seed.0 - radius..=seed.0 + radius {
        for dx in seed.1 - radius..=seed.1 + radius {
            let mut cost = block_cost(current, reference, rect, dy, dx, mode);
            if dy != 0 || dx != 0 {
                cost += ZERO_VECTOR_BIAS;
            }
            if cost < best_cost {
                best_cost = cost;
                best = (dy, dx);
            }
        }
    }

    let sad = block_cost(current, reference, rect, best.0, best.1, SearchMode::Sad);
    MotionVector::new(best.1 as f32, best.0 as f32, sad)
}

/// Evaluate `estimate` for every block of the grid, in parallel for large frames.
fn fill_field<F>(field: &mut MotionField, estimate: F)
where
    F: Fn(usize, usize, BlockRect) -> MotionVector + Send + Sync,
{
    let (rows, cols) = field.grid_dim();
    let (h, w) = (field.height, field.width);
    let block = field.block;

    let compute = |i: usize| {
        let (row, col) = (i / cols, i % cols);
        estimate(row, col, BlockRect::new(row, col, block, h, w))
    };
    let vectors: Vec<MotionVector> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..rows * cols).into_par_iter().map(compute).collect()
    } else {
        (0..rows * cols).map(compute).collect()
    };

    for (i, v) in vectors.into_iter().enumerate() {
        field.vectors[[i / cols, i % cols]] = v;
    }
}

fn check_frames(current: &Frame, reference: &Frame) -> Result<()> {
    ensure_same_dim(current.dim(), reference.dim())?;
    let (h, w) = current.dim();
    if h == 0 || w == 0 {
        return Err(TempoError::InvalidDimensions {
            width: w,
            height: h,
        });
    }
    Ok(())
}

impl MotionEngine for BlockMatchEngine {
    fn name(&self) -> &str {
        "CPU block matching"
    }

    fn analyze(
        &self,
        current: &Frame,
        reference: &Frame,
        block: BlockGeometry,
        search: SearchMode,
        direction: Direction,
    ) -> Result<MotionField> {
        check_frames(current, reference)?;
        let (h, w) = current.dim();
        let radius = self.search_radius as isize;
        let mut field = MotionField::zeros(h, w, block, direction, search);

        fill_field(&mut field, |_, _, rect| {
            search_block(&current.data, &reference.data, rect, (0, 0), radius, search)
        });
        Ok(field)
    }

    fn refine(
        &self,
        field: &MotionField,
        current: &Frame,
        reference: &Frame,
        block: BlockGeometry,
    ) -> Result<MotionField> {
        check_frames(current, reference)?;
        let (h, w) = current.dim();
        if (field.height, field.width) != (h, w) {
            return Err(TempoError::DimensionMismatch {
                expected: (field.height, field.width),
                actual: (h, w),
            });
        }

        let mut refined = MotionField::zeros(h, w, block, field.direction, field.search);
        fill_field(&mut refined, |_, _, rect| {
            let (cy, cx) = rect.center();
            let seed = field.sample(cy, cx);
            search_block(
                &current.data,
                &reference.data,
                rect,
                (seed.dy.round() as isize, seed.dx.round() as isize),
                REFINE_SEARCH_RADIUS,
                field.search,
            )
        });
        Ok(refined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bias_keeps_flat_blocks_still() {
        let flat = Array2::from_elem((8, 8), 0.5f32);
        let rect = BlockRect::new(0, 0, BlockGeometry::square(8), 8, 8);
        let v = search_block(&flat, &flat, rect, (0, 0), 2, SearchMode::Sad);
        assert_eq!((v.dx, v.dy), (0.0, 0.0));
        assert_eq!(v.sad, 0.0);
    }

    #[test]
    fn dct_cost_ignores_brightness_offset() {
        let cur = Array2::from_shape_fn((8, 8), |(r, c)| ((r * 8 + c) % 5) as f32 / 10.0);
        let brighter = cur.mapv(|v| v + 0.2);
        let rect = BlockRect::new(0, 0, BlockGeometry::square(8), 8, 8);
        assert!(block_cost(&cur, &brighter, rect, 0, 0, SearchMode::Dct) < 1e-5);
        assert!(block_cost(&cur, &brighter, rect, 0, 0, SearchMode::Sad) > 0.19);
    }
}
