use crate::consts::{ThresholdBand, THRESHOLD_BANDS};

use super::block::BlockGeometry;

/// Thresholds and mask gamma for one pass, derived from its block geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdSet {
    /// Binarization level of the artifact mask.
    pub mask_threshold: u8,
    /// Binarization level of the skip mask. Always below `mask_threshold`.
    pub skip_threshold: u8,
    /// Scale of the occlusion mask extraction.
    pub occlusion_threshold: u8,
    /// Mask gamma; the extractor receives `1 / gamma` as its exponent.
    pub gamma: f32,
}

/// User-level thresholds before block-size adjustment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseThresholds {
    pub mask: i32,
    pub skip: i32,
    pub occlusion: i32,
    pub gamma: Option<f32>,
}

/// The band whose `max_side` is the first to cover `side`.
pub fn threshold_band(side: usize) -> &'static ThresholdBand {
    THRESHOLD_BANDS
        .iter()
        .find(|band| side <= band.max_side)
        .unwrap_or(&THRESHOLD_BANDS[THRESHOLD_BANDS.len() - 1])
}

impl ThresholdSet {
    /// Adjust base thresholds for a block geometry.
    ///
    /// The result always satisfies `skip_threshold < mask_threshold`, even when
    /// clamping would otherwise make them collide.
    pub fn derive(base: &BaseThresholds, block: BlockGeometry) -> Self {
        let band = threshold_band(block.max_side());
        let mask = (base.mask + band.mask_offset).clamp(1, 255);
        let skip = (base.skip + band.skip_offset).clamp(0, mask - 1);
        let occlusion = (base.occlusion + band.occlusion_offset).clamp(1, 255);

        Self {
            mask_threshold: mask as u8,
            skip_threshold: skip as u8,
            occlusion_threshold: occlusion as u8,
            gamma: base.gamma.unwrap_or(band.gamma),
        }
    }
}
