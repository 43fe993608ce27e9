//! Generic image operations on single-channel arrays and masks.
//!
//! Everything here is a pure function of its inputs. Mask-level wrappers
//! clamp their output into [0, 255].

pub mod blur;
pub mod levels;
pub mod morphology;
pub mod overlay;
pub mod resize;

use ndarray::{Array2, ArrayViewMut1, Axis};
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{Result, TempoError};

pub use blur::{blur, blur_mask, box_blur_array, gaussian_blur_array};
pub use levels::{binarize, binarize_mask};
pub use morphology::{expand, expand_mask, inpand, inpand_mask};
pub use overlay::{abs_diff, lighten, merge_frames, merge_masks, merge_video};
pub use resize::{resize_array, resize_mask, ResizeKernel};

/// Allocate an `h x w` array and fill it row by row.
///
/// Rows are filled in parallel once the image is large enough to pay for it.
pub(crate) fn build_rows<F>(h: usize, w: usize, fill: F) -> Array2<f32>
where
    F: Fn(usize, ArrayViewMut1<'_, f32>) + Send + Sync,
{
    let mut out = Array2::<f32>::zeros((h, w));
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, view)| fill(row, view));
    } else {
        for (row, view) in out.axis_iter_mut(Axis(0)).enumerate() {
            fill(row, view);
        }
    }
    out
}

pub(crate) fn ensure_same_dim(expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
    if expected != actual {
        return Err(TempoError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
