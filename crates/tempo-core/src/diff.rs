//! Secondary pass at a different block size, reconciled with the primary one.
//!
//! Where the two passes disagree, the secondary result wins. The disagreement
//! region is the locality mask: `|EM - EM2|` on a coarse grid, expanded,
//! binarized and softened.

use crate::consts::{LOCALITY_BINARIZE, LOCALITY_BLUR, LOCALITY_EXPAND_RADIUS};
use crate::engine::Engines;
use crate::error::Result;
use crate::frame::{Frame, VideoFrame};
use crate::mask::Mask;
use crate::ops::{
    abs_diff, binarize_mask, blur_mask, expand_mask, merge_masks, merge_video, resize_mask,
    ResizeKernel,
};
use crate::params::{BlockGeometry, PassParams};
use crate::pass::PassAnalysis;

/// Result of the diff pass for one frame pair.
#[derive(Clone, Debug)]
pub struct DiffOutcome {
    pub secondary: PassAnalysis,
    /// Where the secondary pass is preferred, source resolution.
    pub locality: Mask,
    /// EM merged with EM2 through the locality mask.
    pub em: Mask,
}

/// Locality mask between two artifact masks, on the grid of `block`.
pub fn locality_mask(em: &Mask, em2: &Mask, block: BlockGeometry) -> Result<Mask> {
    let (h, w) = em.dim();
    let (rows, cols) = block.grid_dim(h, w);

    let diff = abs_diff(em, em2)?;
    let coarse = resize_mask(&diff, rows, cols, ResizeKernel::Bilinear);
    let coarse = binarize_mask(
        &expand_mask(&coarse, LOCALITY_EXPAND_RADIUS),
        LOCALITY_BINARIZE,
    );
    let coarse = blur_mask(&coarse, LOCALITY_BLUR);
    Ok(resize_mask(&coarse, h, w, ResizeKernel::Bilinear))
}

pub struct DiffReconciler<'a> {
    engines: &'a Engines,
    params: PassParams,
    occlusion: bool,
    /// Grid the locality mask is computed on (the primary analysis block).
    grid: BlockGeometry,
}

impl<'a> DiffReconciler<'a> {
    pub fn new(
        engines: &'a Engines,
        params: PassParams,
        occlusion: bool,
        grid: BlockGeometry,
    ) -> Self {
        Self {
            engines,
            params,
            occlusion,
            grid,
        }
    }

    /// Run the secondary pass and reconcile its mask with the primary one.
    pub fn reconcile(
        &self,
        primary: &PassAnalysis,
        analysis_a: &Frame,
        analysis_b: &Frame,
        source_luma: &Frame,
    ) -> Result<DiffOutcome> {
        let secondary = PassAnalysis::run(
            self.engines,
            &self.params,
            self.occlusion,
            analysis_a,
            analysis_b,
            source_luma,
        )?;
        let locality = locality_mask(&primary.masks.em, &secondary.masks.em, self.grid)?;
        let em = merge_masks(&primary.masks.em, &secondary.masks.em, &locality)?;
        Ok(DiffOutcome {
            secondary,
            locality,
            em,
        })
    }
}

impl DiffOutcome {
    /// Merge the primary flow frame with the secondary one through the locality mask.
    pub fn merge_flow(&self, flow: &VideoFrame, flow2: &VideoFrame) -> Result<VideoFrame> {
        merge_video(flow, flow2, &self.locality)
    }
}
