//! Stripe/banding mask: texture that repeats at the block period.
//!
//! Block search aliases on such patterns (fences, blinds, halftone), so they
//! are flagged from the source image alone, independent of the motion field.

use ndarray::Array2;

use crate::consts::{
    MASK_MAX, STRIPE_BINARIZE, STRIPE_EXPAND_RADIUS, STRIPE_GAIN, STRIPE_POST_BLUR,
    STRIPE_PRE_BLUR, STRIPE_WIDE_BLUR, STRIPE_WIDE_EXPAND_RADIUS,
};
use crate::frame::Frame;
use crate::mask::Mask;
use crate::ops::{
    binarize_mask, blur_mask, build_rows, expand_mask, resize_mask, ResizeKernel,
};
use crate::params::BlockGeometry;

/// The stripe mask at two smoothing levels, both at source resolution.
#[derive(Clone, Debug)]
pub struct StripeMasks {
    /// Tight version, overlaid into the raw mask.
    pub fine: Mask,
    /// Wide, soft version that reinstates large stripe patches in the final mask.
    pub wide: Mask,
}

/// Per-pixel block-periodic texture measure.
///
/// `g` is the local gradient, `d` the smaller of the differences to the pixel
/// one block further right and one block further down. Texture that repeats at
/// the block period has a large `g` and a near-zero `d`.
pub fn stripe_response(source: &Frame, block: BlockGeometry) -> Mask {
    let data: &Array2<f32> = &source.data;
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return Mask::zeros(h, w);
    }

    let at = |y: usize, x: usize| data[[y.min(h - 1), x.min(w - 1)]];
    let response = build_rows(h, w, |y, mut out| {
        for x in 0..w {
            let v = data[[y, x]];
            let g = (at(y, x + 1) - v).abs() + (at(y + 1, x) - v).abs();
            let d = (at(y, x + block.width) - v)
                .abs()
                .min((at(y + block.height, x) - v).abs());
            out[x] = MASK_MAX * STRIPE_GAIN * (g - d).max(0.0);
        }
    });
    Mask::new(response)
}

/// Isolate large contiguous stripe regions.
///
/// downsample to the block grid → blur → binarize → expand → blur → upsample.
pub fn stripe_masks(source: &Frame, block: BlockGeometry) -> StripeMasks {
    let (h, w) = source.dim();
    let (rows, cols) = block.grid_dim(h, w);

    let response = stripe_response(source, block);
    let coarse = resize_mask(&response, rows, cols, ResizeKernel::Bilinear);
    let binary = binarize_mask(&blur_mask(&coarse, STRIPE_PRE_BLUR), STRIPE_BINARIZE);

    let fine = blur_mask(&expand_mask(&binary, STRIPE_EXPAND_RADIUS), STRIPE_POST_BLUR);
    let wide = blur_mask(
        &expand_mask(&binary, STRIPE_WIDE_EXPAND_RADIUS),
        STRIPE_WIDE_BLUR,
    );

    StripeMasks {
        fine: resize_mask(&fine, h, w, ResizeKernel::Bilinear),
        wide: resize_mask(&wide, h, w, ResizeKernel::Bilinear),
    }
}
