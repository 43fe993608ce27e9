//! Routing of pipeline stages to the output clip.

use std::fmt;
use std::str::FromStr;

use ndarray::Zip;
use serde::{Deserialize, Serialize};

use crate::composite::{DecisionState, FallbackPolicy, FrameDecision};
use crate::consts::{DEBUG_BAR_HEIGHT, MASK_MAX, OVERLAY_TINT};
use crate::error::{ConfigError, Result};
use crate::frame::{ColorFrame, Frame, VideoFrame};
use crate::mask::Mask;
use crate::masks::MaskSet;
use crate::ops::{ensure_same_dim, resize_mask, ResizeKernel};

/// Which stage of the pipeline ends up in the output clip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Final composite.
    #[default]
    Auto,
    /// Motion-compensated frames only.
    Flow,
    /// Plain cross-faded retime, no analysis at all.
    None,
    /// Artifact mask.
    Mask,
    /// Skip mask at source resolution.
    Skip,
    /// Motion mask merged with the stripe mask.
    Raw,
    /// Locality mask of the diff pass.
    Diff,
    /// Artifact mask tinted cyan over the final composite.
    Over,
}

impl OutputMode {
    pub const ALL: [OutputMode; 8] = [
        Self::Auto,
        Self::Flow,
        Self::None,
        Self::Mask,
        Self::Skip,
        Self::Raw,
        Self::Diff,
        Self::Over,
    ];

    /// Modes that need motion analysis at all.
    pub fn needs_analysis(self) -> bool {
        self != Self::None
    }

    /// Modes that output a single-channel mask.
    pub fn is_mask_view(self) -> bool {
        matches!(self, Self::Mask | Self::Skip | Self::Raw | Self::Diff)
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Flow => "flow",
            Self::None => "none",
            Self::Mask => "mask",
            Self::Skip => "skip",
            Self::Raw => "raw",
            Self::Diff => "diff",
            Self::Over => "over",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownOutputMode(s.to_string()))
    }
}

/// Every stage result for one interpolated output position.
pub struct StageViews<'a> {
    pub composite: &'a VideoFrame,
    /// Primary-pass motion-compensated frame.
    pub flow: &'a VideoFrame,
    pub blended: &'a VideoFrame,
    /// Primary-pass masks.
    pub masks: &'a MaskSet,
    /// Artifact mask after diff reconciliation.
    pub em_final: &'a Mask,
    pub locality: Option<&'a Mask>,
    pub decision: FrameDecision,
}

#[derive(Clone, Copy, Debug)]
pub struct OutputSelector {
    mode: OutputMode,
    debug: bool,
    policy: FallbackPolicy,
}

impl OutputSelector {
    pub fn new(mode: OutputMode, debug: bool, policy: FallbackPolicy) -> Self {
        Self {
            mode,
            debug,
            policy,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Output for a position that coincides with source frame `source`.
    pub fn passthrough(&self, source: &VideoFrame) -> VideoFrame {
        match self.mode {
            mode if mode.is_mask_view() => {
                let (h, w) = source.dim();
                mask_frame(&Mask::zeros(h, w))
            }
            OutputMode::Over => VideoFrame::Color(source.to_color()),
            _ => source.clone(),
        }
    }

    /// Output for an interpolated position.
    pub fn route(&self, views: &StageViews<'_>) -> Result<VideoFrame> {
        let (h, w) = views.composite.dim();
        let mut frame = match self.mode {
            OutputMode::Auto => views.composite.clone(),
            OutputMode::Flow => views.flow.clone(),
            OutputMode::None => views.blended.clone(),
            OutputMode::Mask => mask_frame(&views.masks.em),
            OutputMode::Skip => mask_frame(&resize_mask(
                &views.masks.em_skip,
                h,
                w,
                ResizeKernel::Bilinear,
            )),
            OutputMode::Raw => mask_frame(&views.masks.raw),
            OutputMode::Diff => {
                let locality = views
                    .locality
                    .ok_or(ConfigError::DiffOutputWithoutDiffPass)?;
                mask_frame(locality)
            }
            OutputMode::Over => cyan_overlay(views.composite, views.em_final)?,
        };
        if self.debug {
            draw_stats_bar(&mut frame, &views.decision, self.policy);
        }
        Ok(frame)
    }
}

/// Mask as a mono frame in [0, 1].
pub fn mask_frame(mask: &Mask) -> VideoFrame {
    VideoFrame::Mono(mask.to_frame())
}

/// Tint `frame` toward cyan where `mask` is set.
pub fn cyan_overlay(frame: &VideoFrame, mask: &Mask) -> Result<VideoFrame> {
    ensure_same_dim(frame.dim(), mask.dim())?;
    let color = frame.to_color();
    let tint = |plane: &Frame, toward_white: bool| {
        let data = Zip::from(&plane.data)
            .and(&mask.data)
            .map_collect(|&v, &m| {
                let k = m / MASK_MAX * OVERLAY_TINT;
                if toward_white {
                    v + (1.0 - v) * k
                } else {
                    v * (1.0 - k)
                }
            });
        Frame::new(data, plane.original_bit_depth)
    };
    Ok(VideoFrame::Color(ColorFrame {
        red: tint(&color.red, false),
        green: tint(&color.green, true),
        blue: tint(&color.blue, true),
    }))
}

fn swatch_level(state: DecisionState) -> f32 {
    match state {
        DecisionState::Interpolate => 0.25,
        DecisionState::Blend => 0.6,
        DecisionState::Duplicate => 1.0,
    }
}

/// Paint the skip statistic, the fallback thresholds and the decided state
/// into the top rows of `frame`.
///
/// Layout: a bar whose length is `skip / 255` of the width, half-gray ticks
/// at the enabled thresholds, then a state swatch at the right edge.
pub fn draw_stats_bar(frame: &mut VideoFrame, decision: &FrameDecision, policy: FallbackPolicy) {
    let (h, w) = frame.dim();
    let rows = DEBUG_BAR_HEIGHT.min(h);
    let swatch = (DEBUG_BAR_HEIGHT * 2).min(w);
    let bar_w = w - swatch;

    let column_of = |level: f32| ((level / MASK_MAX).clamp(0.0, 1.0) * bar_w as f32).round() as usize;
    let filled = column_of(decision.skip);
    let ticks: Vec<usize> = [policy.blend_over, policy.skip_over]
        .into_iter()
        .filter(|&t| t > 0)
        .map(|t| column_of(t as f32).min(bar_w.saturating_sub(1)))
        .collect();
    let swatch_value = swatch_level(decision.state);

    frame.for_each_plane_mut(|plane| {
        for y in 0..rows {
            for x in 0..bar_w {
                plane.data[[y, x]] = if ticks.contains(&x) {
                    0.5
                } else if x < filled {
                    1.0
                } else {
                    0.0
                };
            }
            for x in bar_w..w {
                plane.data[[y, x]] = swatch_value;
            }
        }
    });
}
