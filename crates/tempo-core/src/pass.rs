//! One motion/mask pass over a source frame pair.

use crate::engine::{Direction, Engines, MotionField};
use crate::error::Result;
use crate::frame::{Frame, VideoFrame};
use crate::masks::{MaskBuilder, MaskSet};
use crate::params::PassParams;

/// Motion fields and masks of one pass.
#[derive(Clone, Debug)]
pub struct PassAnalysis {
    pub forward: MotionField,
    pub backward: MotionField,
    pub masks: MaskSet,
}

/// Estimate both fields for `(a, b)`, refining them when configured.
pub fn analyze_fields(
    engines: &Engines,
    params: &PassParams,
    a: &Frame,
    b: &Frame,
) -> Result<(MotionField, MotionField)> {
    let motion = engines.motion.as_ref();
    let mut forward = motion.analyze(a, b, params.block, params.search, Direction::Forward)?;
    let mut backward = motion.analyze(b, a, params.block, params.search, Direction::Backward)?;

    if let Some(refine_block) = params.refine_block {
        forward = motion.refine(&forward, a, b, refine_block)?;
        backward = motion.refine(&backward, b, a, refine_block)?;
    }
    Ok((forward, backward))
}

impl PassAnalysis {
    /// Run a full pass.
    ///
    /// `analysis_*` are the (possibly prefiltered) luma planes the motion search
    /// sees; `source_luma` is the unfiltered first frame the stripe mask is
    /// computed from.
    pub fn run(
        engines: &Engines,
        params: &PassParams,
        occlusion: bool,
        analysis_a: &Frame,
        analysis_b: &Frame,
        source_luma: &Frame,
    ) -> Result<Self> {
        let (forward, backward) = analyze_fields(engines, params, analysis_a, analysis_b)?;
        let builder = MaskBuilder::new(engines.masks.as_ref(), params.thresholds, occlusion);
        let masks = builder.build(source_luma, &forward, &backward)?;
        Ok(Self {
            forward,
            backward,
            masks,
        })
    }

    /// Motion-compensated frame at phase `t`, every plane warped with the luma fields.
    pub fn interpolate(
        &self,
        engines: &Engines,
        a: &VideoFrame,
        b: &VideoFrame,
        t: f32,
    ) -> Result<VideoFrame> {
        a.zip_planes(b, |pa, pb| {
            engines
                .interpolator
                .interpolate_at(pa, pb, &self.forward, &self.backward, t)
        })
    }
}
