use tracing::info;

use crate::composite::FallbackPolicy;
use crate::engine::SearchMode;
use crate::error::ConfigError;
use crate::output::OutputMode;
use crate::pipeline::config::InterpolationConfig;

use super::block::BlockGeometry;
use super::preset::FeatureFlags;
use super::thresholds::{BaseThresholds, ThresholdSet};

/// Everything one motion/mask pass needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassParams {
    /// Block size of the initial analysis; thresholds are keyed on it.
    pub block: BlockGeometry,
    /// Block size of the recalculation pass, when enabled.
    pub refine_block: Option<BlockGeometry>,
    pub search: SearchMode,
    pub thresholds: ThresholdSet,
}

impl PassParams {
    /// Geometry of the motion field the masks are built from.
    pub fn analysis_block(&self) -> BlockGeometry {
        self.refine_block.unwrap_or(self.block)
    }
}

/// Immutable parameters for one invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedParams {
    pub primary: PassParams,
    /// Present exactly when the diff pass runs.
    pub secondary: Option<PassParams>,
    pub flags: FeatureFlags,
    pub policy: FallbackPolicy,
    pub occlusion: bool,
    pub output: OutputMode,
    pub debug: bool,
}

fn check_range(name: &'static str, value: i32) -> Result<(), ConfigError> {
    if !(0..=255).contains(&value) {
        return Err(ConfigError::ThresholdOutOfRange { name, value });
    }
    Ok(())
}

fn validate(config: &InterpolationConfig) -> Result<(), ConfigError> {
    check_range("mask_threshold", config.mask_threshold)?;
    check_range("skip_threshold", config.skip_threshold)?;
    check_range("occlusion_threshold", config.occlusion_threshold)?;
    check_range("blend_over", config.blend_over)?;
    check_range("skip_over", config.skip_over)?;

    if config.skip_threshold >= config.mask_threshold {
        return Err(ConfigError::InvertedThresholds {
            mask: config.mask_threshold,
            skip: config.skip_threshold,
        });
    }
    if let Some(gamma) = config.gamma {
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(ConfigError::InvalidGamma(gamma));
        }
    }
    if config.blend_over > 0 && config.skip_over > 0 && config.blend_over >= config.skip_over {
        return Err(ConfigError::InvertedFallbackOrder {
            blend_over: config.blend_over,
            skip_over: config.skip_over,
        });
    }
    Ok(())
}

fn pass_params(
    block: BlockGeometry,
    search: SearchMode,
    recalculate: bool,
    base: &BaseThresholds,
) -> PassParams {
    let refine_block = if recalculate {
        Some(block.halved()).filter(|refined| *refined != block)
    } else {
        None
    };
    PassParams {
        block,
        refine_block,
        search,
        thresholds: ThresholdSet::derive(base, block),
    }
}

/// Derive all pass parameters from the configuration and source resolution.
///
/// Pure: the same inputs always give the same result. All validation happens
/// here, before any frame is touched.
pub fn resolve(
    config: &InterpolationConfig,
    width: usize,
    height: usize,
) -> Result<ResolvedParams, ConfigError> {
    validate(config)?;

    let preset_flags = config.preset.flags();
    let primary_block = match config.block_size {
        Some(b) => BlockGeometry::snapped(b.width, b.height)?,
        None => BlockGeometry::for_resolution(width, height),
    };

    let secondary_block = match config.secondary_block_size {
        Some(b) => Some(BlockGeometry::snapped(b.width, b.height)?),
        None if preset_flags.use_diff_pass => {
            let halved = primary_block.halved();
            Some(if halved == primary_block {
                primary_block.doubled()
            } else {
                halved
            })
        }
        None => None,
    }
    .filter(|secondary| *secondary != primary_block);

    let flags = FeatureFlags {
        use_diff_pass: secondary_block.is_some(),
        ..preset_flags
    };

    if config.output == OutputMode::Diff && !flags.use_diff_pass {
        return Err(ConfigError::DiffOutputWithoutDiffPass);
    }

    let base = BaseThresholds {
        mask: config.mask_threshold,
        skip: config.skip_threshold,
        occlusion: config.occlusion_threshold,
        gamma: config.gamma,
    };

    let primary_search = if flags.use_dct_search {
        SearchMode::Dct
    } else {
        SearchMode::Sad
    };
    let primary = pass_params(primary_block, primary_search, flags.use_recalculation, &base);
    let secondary = secondary_block
        .map(|block| pass_params(block, primary_search.other(), flags.use_recalculation, &base));

    let resolved = ResolvedParams {
        primary,
        secondary,
        flags,
        policy: FallbackPolicy::new(config.blend_over as u8, config.skip_over as u8),
        occlusion: config.occlusion,
        output: config.output,
        debug: config.debug,
    };

    info!(
        preset = %config.preset,
        block = %resolved.primary.block,
        mask = resolved.primary.thresholds.mask_threshold,
        skip = resolved.primary.thresholds.skip_threshold,
        gamma = resolved.primary.thresholds.gamma,
        diff = resolved.flags.use_diff_pass,
        "Resolved interpolation parameters"
    );

    Ok(resolved)
}
