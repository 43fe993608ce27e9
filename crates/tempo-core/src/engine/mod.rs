//! Interfaces to the external motion, interpolation and mask engines.
//!
//! The compositing pipeline only talks to these traits. The submodules
//! hold small reference implementations so a clip can be processed end to
//! end without a third-party engine.

pub mod block_match;
pub mod flow;
pub mod mask_extract;
pub mod motion;
pub mod prefilter;
pub mod retime;

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::frame::Frame;
use crate::mask::Mask;
use crate::params::BlockGeometry;

pub use block_match::BlockMatchEngine;
pub use flow::FlowInterpolator;
pub use mask_extract::BlockMaskExtractor;
pub use motion::{Direction, MotionField, MotionVector};
pub use prefilter::GaussianPrefilter;
pub use retime::{hard_duplicate, time_blend};

/// Block matching cost used by the motion search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// Plain sum of absolute differences.
    #[default]
    Sad,
    /// Cosine-transform-aided cost: the DC term is removed before comparing,
    /// which makes the search robust to brightness changes.
    Dct,
}

impl SearchMode {
    /// The mode a secondary pass uses to disagree with this one.
    pub fn other(self) -> Self {
        match self {
            Self::Sad => Self::Dct,
            Self::Dct => Self::Sad,
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sad => write!(f, "SAD"),
            Self::Dct => write!(f, "DCT"),
        }
    }
}

/// Kind of confidence image extracted from a motion field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaskKind {
    /// Block matching residual.
    Sad,
    /// Vector-field discontinuities, where content appears or disappears.
    Occlusion,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskParams {
    pub kind: MaskKind,
    /// Level that maps to full white; smaller is stronger.
    pub scale: f32,
    /// Exponent applied to the normalized value.
    pub gamma: f32,
}

/// Estimates block motion between two frames.
pub trait MotionEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Tile `current` with blocks and find each block in `reference`.
    fn analyze(
        &self,
        current: &Frame,
        reference: &Frame,
        block: BlockGeometry,
        search: SearchMode,
        direction: Direction,
    ) -> Result<MotionField>;

    /// Re-estimate `field` at a smaller block size, seeded by its vectors.
    fn refine(
        &self,
        field: &MotionField,
        current: &Frame,
        reference: &Frame,
        block: BlockGeometry,
    ) -> Result<MotionField>;
}

/// Produces a frame at temporal position `t` in [0, 1] between `a` and `b`.
pub trait Interpolator: Send + Sync {
    fn interpolate_at(
        &self,
        a: &Frame,
        b: &Frame,
        forward: &MotionField,
        backward: &MotionField,
        t: f32,
    ) -> Result<Frame>;
}

/// Extracts a full-resolution confidence mask from a motion field.
pub trait MaskExtractor: Send + Sync {
    fn extract_mask(&self, field: &MotionField, params: MaskParams) -> Result<Mask>;
}

/// Denoise applied before motion estimation.
pub trait Prefilter: Send + Sync {
    fn prefilter(&self, frame: &Frame) -> Frame;
}

/// Handles to every engine the pipeline needs.
#[derive(Clone)]
pub struct Engines {
    pub motion: Arc<dyn MotionEngine>,
    pub interpolator: Arc<dyn Interpolator>,
    pub masks: Arc<dyn MaskExtractor>,
    pub prefilter: Option<Arc<dyn Prefilter>>,
}

impl Engines {
    /// The built-in CPU engines.
    pub fn reference(search_radius: usize, prefilter_sigma: Option<f32>) -> Self {
        let prefilter = prefilter_sigma
            .filter(|sigma| *sigma > 0.0)
            .map(|sigma| Arc::new(GaussianPrefilter::new(sigma)) as Arc<dyn Prefilter>);
        Self {
            motion: Arc::new(BlockMatchEngine::new(search_radius)),
            interpolator: Arc::new(FlowInterpolator),
            masks: Arc::new(BlockMaskExtractor),
            prefilter,
        }
    }
}

impl fmt::Debug for Engines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engines")
            .field("motion", &self.motion.name())
            .field("prefilter", &self.prefilter.is_some())
            .finish()
    }
}
