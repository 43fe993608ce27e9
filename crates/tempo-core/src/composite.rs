//! Per-frame fallback decision and final compositing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::frame::VideoFrame;
use crate::mask::Mask;
use crate::ops::{merge_video, resize_mask, ResizeKernel};

/// How an interpolated output frame is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionState {
    /// Motion-compensated frame, replaced by the blend where EM is set.
    Interpolate,
    /// Linear cross-fade, whole frame.
    Blend,
    /// Nearest source frame, whole frame.
    Duplicate,
}

impl DecisionState {
    pub const ALL: [DecisionState; 3] = [Self::Interpolate, Self::Blend, Self::Duplicate];

    /// Single-letter tag used in reports.
    pub fn letter(self) -> char {
        match self {
            Self::Interpolate => 'A',
            Self::Blend => 'B',
            Self::Duplicate => 'C',
        }
    }
}

impl fmt::Display for DecisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Interpolate => "interpolate",
            Self::Blend => "blend",
            Self::Duplicate => "duplicate",
        };
        f.write_str(name)
    }
}

/// Frame-level thresholds on the skip statistic. A zero threshold is disabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    pub blend_over: u8,
    pub skip_over: u8,
}

impl FallbackPolicy {
    pub fn new(blend_over: u8, skip_over: u8) -> Self {
        Self {
            blend_over,
            skip_over,
        }
    }

    /// True when at least one fallback can trigger.
    pub fn is_enabled(&self) -> bool {
        self.blend_over > 0 || self.skip_over > 0
    }

    pub fn decide(&self, skip: f32) -> DecisionState {
        if self.skip_over > 0 && skip >= self.skip_over as f32 {
            DecisionState::Duplicate
        } else if self.blend_over > 0 && skip >= self.blend_over as f32 {
            DecisionState::Blend
        } else {
            DecisionState::Interpolate
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameDecision {
    /// Mean of the skip mask at source resolution, in [0, 255].
    pub skip: f32,
    pub state: DecisionState,
}

/// The three candidate frames for one output position.
#[derive(Clone, Copy, Debug)]
pub struct Candidates<'a> {
    pub flow: &'a VideoFrame,
    pub blended: &'a VideoFrame,
    pub duplicated: &'a VideoFrame,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FrameCompositor {
    policy: FallbackPolicy,
}

impl FrameCompositor {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Mean of the grid-resolution skip mask after upsampling to `height`x`width`.
    pub fn skip_statistic(em_skip: &Mask, height: usize, width: usize) -> f32 {
        if em_skip.dim() == (height, width) {
            return em_skip.mean();
        }
        resize_mask(em_skip, height, width, ResizeKernel::Bilinear).mean()
    }

    pub fn decide(&self, em_skip: &Mask, height: usize, width: usize) -> FrameDecision {
        let skip = Self::skip_statistic(em_skip, height, width);
        FrameDecision {
            skip,
            state: self.policy.decide(skip),
        }
    }

    /// Composite the candidates through the artifact mask `em`.
    pub fn composite(
        &self,
        candidates: Candidates<'_>,
        em: &Mask,
        decision: &FrameDecision,
    ) -> Result<VideoFrame> {
        let Candidates {
            flow,
            blended,
            duplicated,
        } = candidates;
        match decision.state {
            DecisionState::Interpolate => merge_video(flow, blended, em),
            DecisionState::Blend => Ok(blended.clone()),
            DecisionState::Duplicate => Ok(duplicated.clone()),
        }
    }
}
