use ndarray::Array2;

use crate::consts::MASK_MAX;
use crate::mask::Mask;

/// Binarize: values at or above `threshold` become 255, the rest 0.
pub fn binarize(data: &Array2<f32>, threshold: f32) -> Array2<f32> {
    data.mapv(|v| if v >= threshold { MASK_MAX } else { 0.0 })
}

pub fn binarize_mask(mask: &Mask, threshold: f32) -> Mask {
    Mask {
        data: binarize(&mask.data, threshold),
    }
}
