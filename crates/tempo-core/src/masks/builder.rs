use crate::consts::{
    EM_BLUR_RADIUS, EM_STRIPE_OPACITY, FORWARD_BACKWARD_OPACITY, GRID_EXPAND_RADIUS,
    OCCLUSION_INPAND_RADIUS, OCCLUSION_OPACITY, RAW_STRIPE_OPACITY, SAD_MASK_MAX_STRENGTH,
};
use crate::engine::{MaskExtractor, MaskKind, MaskParams, MotionField};
use crate::error::Result;
use crate::frame::Frame;
use crate::mask::Mask;
use crate::ops::{
    binarize_mask, blur_mask, ensure_same_dim, expand_mask, inpand_mask, lighten, resize_mask,
    ResizeKernel,
};
use crate::params::ThresholdSet;

use super::stripe::stripe_masks;

/// Masks of one pass for one source frame pair.
#[derive(Clone, Debug)]
pub struct MaskSet {
    /// Final artifact mask (EM), source resolution.
    pub em: Mask,
    /// Binary skip mask (EMskip), block-grid resolution.
    pub em_skip: Mask,
    /// Motion mask merged with the stripe mask (OutRaw), source resolution.
    pub raw: Mask,
}

impl MaskSet {
    /// All-clear masks for a `h`x`w` frame on a `rows`x`cols` grid.
    pub fn zeros(h: usize, w: usize, rows: usize, cols: usize) -> Self {
        Self {
            em: Mask::zeros(h, w),
            em_skip: Mask::zeros(rows, cols),
            raw: Mask::zeros(h, w),
        }
    }
}

/// Builds the artifact, skip and raw masks from a pair of motion fields.
pub struct MaskBuilder<'a> {
    extractor: &'a dyn MaskExtractor,
    thresholds: ThresholdSet,
    occlusion: bool,
}

impl<'a> MaskBuilder<'a> {
    pub fn new(extractor: &'a dyn MaskExtractor, thresholds: ThresholdSet, occlusion: bool) -> Self {
        Self {
            extractor,
            thresholds,
            occlusion,
        }
    }

    /// SAD masks of both fields, lightened together, plus the occlusion mask.
    pub fn motion_mask(&self, forward: &MotionField, backward: &MotionField) -> Result<Mask> {
        let sad = MaskParams {
            kind: MaskKind::Sad,
            scale: SAD_MASK_MAX_STRENGTH,
            gamma: 1.0 / self.thresholds.gamma,
        };
        let from_backward = self.extractor.extract_mask(backward, sad)?;
        let from_forward = self.extractor.extract_mask(forward, sad)?;
        let combined = lighten(&from_backward, &from_forward, FORWARD_BACKWARD_OPACITY)?;

        if !self.occlusion {
            return Ok(combined);
        }

        let occlusion = self.extractor.extract_mask(
            backward,
            MaskParams {
                kind: MaskKind::Occlusion,
                scale: self.thresholds.occlusion_threshold as f32,
                gamma: 1.0,
            },
        )?;
        let occlusion = inpand_mask(&occlusion, OCCLUSION_INPAND_RADIUS);
        lighten(&combined, &occlusion, OCCLUSION_OPACITY)
    }

    /// Build all masks for the pair whose first frame is `source`.
    pub fn build(
        &self,
        source: &Frame,
        forward: &MotionField,
        backward: &MotionField,
    ) -> Result<MaskSet> {
        let (h, w) = source.dim();
        let motion = self.motion_mask(forward, backward)?;
        ensure_same_dim((h, w), motion.dim())?;

        let block = forward.block;
        let (rows, cols) = block.grid_dim(h, w);
        let stripes = stripe_masks(source, block);

        let raw = lighten(&motion, &stripes.fine, RAW_STRIPE_OPACITY)?;

        let em_skip = resize_mask(&raw, rows, cols, ResizeKernel::Bilinear);
        let em_skip = binarize_mask(
            &expand_mask(&em_skip, GRID_EXPAND_RADIUS),
            self.thresholds.skip_threshold as f32,
        );

        let em = resize_mask(&motion, rows, cols, ResizeKernel::Bilinear);
        let em = binarize_mask(
            &expand_mask(&em, GRID_EXPAND_RADIUS),
            self.thresholds.mask_threshold as f32,
        );
        let em = resize_mask(&blur_mask(&em, EM_BLUR_RADIUS), h, w, ResizeKernel::Bilinear);
        let em = lighten(&em, &stripes.wide, EM_STRIPE_OPACITY)?;

        Ok(MaskSet { em, em_skip, raw })
    }
}
