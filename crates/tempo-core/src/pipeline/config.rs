use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BLEND_OVER, DEFAULT_MASK_THRESHOLD, DEFAULT_OCCLUSION_THRESHOLD,
    DEFAULT_SEARCH_RADIUS, DEFAULT_SKIP_OVER, DEFAULT_SKIP_THRESHOLD,
};
use crate::error::ConfigError;
use crate::frame::FrameRate;
use crate::io::image_io::OutputFormat;
use crate::output::OutputMode;
use crate::params::{BlockGeometry, Preset};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory of source frames.
    pub input: PathBuf,
    /// Directory the retimed frames are written to.
    pub output: PathBuf,
    #[serde(default = "default_source_fps")]
    pub source_fps: FrameRate,
    #[serde(default)]
    pub target_fps: Option<FrameRate>,
    /// Double the source rate; ignored when `target_fps` is set.
    #[serde(default = "default_frame_double")]
    pub frame_double: bool,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub interpolation: InterpolationConfig,
}

fn default_source_fps() -> FrameRate {
    FrameRate { num: 24, den: 1 }
}

fn default_frame_double() -> bool {
    true
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            source_fps: default_source_fps(),
            target_fps: None,
            frame_double: default_frame_double(),
            format: OutputFormat::default(),
            interpolation: InterpolationConfig::default(),
        }
    }

    /// Effective output rate.
    pub fn target_rate(&self) -> Result<FrameRate, ConfigError> {
        match self.target_fps {
            Some(rate) => Ok(rate),
            None if self.frame_double => self.source_fps.doubled(),
            None => Err(ConfigError::MissingTargetRate),
        }
    }
}

/// User-facing interpolation settings. Everything is resolved against the
/// source resolution by [`crate::params::resolve`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    pub preset: Preset,
    /// Primary block size; picked from the resolution when unset.
    pub block_size: Option<BlockGeometry>,
    /// Secondary block size; enables the diff pass when it differs from the primary.
    pub secondary_block_size: Option<BlockGeometry>,
    pub mask_threshold: i32,
    pub skip_threshold: i32,
    pub occlusion_threshold: i32,
    /// Overrides the per-band gamma.
    pub gamma: Option<f32>,
    pub occlusion: bool,
    /// Skip statistic from which a frame falls back to the cross-fade. 0 disables.
    pub blend_over: i32,
    /// Skip statistic from which a frame falls back to duplication. 0 disables.
    pub skip_over: i32,
    pub output: OutputMode,
    pub debug: bool,
    /// Gaussian denoise before motion search, off when unset.
    pub prefilter_sigma: Option<f32>,
    pub search_radius: usize,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            block_size: None,
            secondary_block_size: None,
            mask_threshold: DEFAULT_MASK_THRESHOLD,
            skip_threshold: DEFAULT_SKIP_THRESHOLD,
            occlusion_threshold: DEFAULT_OCCLUSION_THRESHOLD,
            gamma: None,
            occlusion: true,
            blend_over: DEFAULT_BLEND_OVER,
            skip_over: DEFAULT_SKIP_OVER,
            output: OutputMode::default(),
            debug: false,
            prefilter_sigma: None,
            search_radius: DEFAULT_SEARCH_RADIUS,
        }
    }
}
