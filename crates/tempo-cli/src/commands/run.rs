use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tempo_core::consts::{
    DEFAULT_BLEND_OVER, DEFAULT_MASK_THRESHOLD, DEFAULT_OCCLUSION_THRESHOLD,
    DEFAULT_SEARCH_RADIUS, DEFAULT_SKIP_OVER, DEFAULT_SKIP_THRESHOLD,
};
use tempo_core::engine::Engines;
use tempo_core::frame::FrameRate;
use tempo_core::io::OutputFormat;
use tempo_core::output::OutputMode;
use tempo_core::params::{BlockGeometry, Preset};
use tempo_core::pipeline::{
    run_pipeline_reported, InterpolationConfig, PipelineConfig, PipelineStage, ProgressReporter,
};
use tracing::debug;

use crate::summary::{print_retime_report, print_run_summary};

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Png,
    Tiff,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Tiff => OutputFormat::Tiff,
        }
    }
}

/// Parse a block size given as `16` or `16x8`.
fn parse_block(s: &str) -> Result<BlockGeometry, String> {
    let parse_side = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid block size '{s}'"))
    };
    let (width, height) = match s.split_once(['x', 'X']) {
        Some((w, h)) => (parse_side(w)?, parse_side(h)?),
        None => {
            let side = parse_side(s)?;
            (side, side)
        }
    };
    BlockGeometry::snapped(width, height).map_err(|e| e.to_string())
}

/// Interpolation settings shared by `run` and `params`.
#[derive(Args)]
pub struct InterpolationArgs {
    /// Speed/quality preset: slower, slow, normal (medium), fast
    #[arg(long, default_value = "normal")]
    pub preset: Preset,

    /// Primary block size, e.g. 16 or 16x8 (picked from the resolution when omitted)
    #[arg(long, value_parser = parse_block)]
    pub block_size: Option<BlockGeometry>,

    /// Secondary block size for the diff pass (slower preset only)
    #[arg(long, value_parser = parse_block)]
    pub secondary_block_size: Option<BlockGeometry>,

    /// Artifact mask threshold (0-255)
    #[arg(long, default_value_t = DEFAULT_MASK_THRESHOLD)]
    pub mask_threshold: i32,

    /// Skip mask threshold (0-255), below the mask threshold
    #[arg(long, default_value_t = DEFAULT_SKIP_THRESHOLD)]
    pub skip_threshold: i32,

    /// Occlusion mask threshold (0-255)
    #[arg(long, default_value_t = DEFAULT_OCCLUSION_THRESHOLD)]
    pub occlusion_threshold: i32,

    /// Override the mask gamma
    #[arg(long)]
    pub gamma: Option<f32>,

    /// Leave occlusion out of the artifact mask
    #[arg(long)]
    pub no_occlusion: bool,

    /// Skip statistic from which whole frames are cross-faded (0 disables)
    #[arg(long, default_value_t = DEFAULT_BLEND_OVER)]
    pub blend_over: i32,

    /// Skip statistic from which whole frames are duplicated (0 disables)
    #[arg(long, default_value_t = DEFAULT_SKIP_OVER)]
    pub skip_over: i32,

    /// Stage written to the output: auto, flow, none, mask, skip, raw, diff, over
    #[arg(long, default_value = "auto")]
    pub view: OutputMode,

    /// Draw the skip statistic bar on every interpolated frame
    #[arg(long)]
    pub debug: bool,

    /// Gaussian sigma applied before motion search
    #[arg(long)]
    pub prefilter: Option<f32>,

    /// Motion search radius in pixels
    #[arg(long, default_value_t = DEFAULT_SEARCH_RADIUS)]
    pub search_radius: usize,
}

impl InterpolationArgs {
    pub fn to_config(&self) -> InterpolationConfig {
        InterpolationConfig {
            preset: self.preset,
            block_size: self.block_size,
            secondary_block_size: self.secondary_block_size,
            mask_threshold: self.mask_threshold,
            skip_threshold: self.skip_threshold,
            occlusion_threshold: self.occlusion_threshold,
            gamma: self.gamma,
            occlusion: !self.no_occlusion,
            blend_over: self.blend_over,
            skip_over: self.skip_over,
            output: self.view,
            debug: self.debug,
            prefilter_sigma: self.prefilter,
            search_radius: self.search_radius,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// Directory of source frames
    pub input: PathBuf,

    /// Directory for the retimed frames
    #[arg(short, long, default_value = "retimed")]
    pub output: PathBuf,

    /// Pipeline config file (TOML); replaces the options below
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Source frame rate, e.g. 24, 29.97 or 30000/1001
    #[arg(long, default_value = "24")]
    pub source_fps: FrameRate,

    /// Target frame rate (defaults to double the source rate)
    #[arg(long)]
    pub target_fps: Option<FrameRate>,

    /// Output image format
    #[arg(long, value_enum, default_value = "png")]
    pub format: FormatArg,

    #[command(flatten)]
    pub interpolation: InterpolationArgs,
}

fn build_config_from_args(args: &RunArgs) -> PipelineConfig {
    PipelineConfig {
        input: args.input.clone(),
        output: args.output.clone(),
        source_fps: args.source_fps,
        target_fps: args.target_fps,
        frame_double: true,
        format: args.format.into(),
        interpolation: args.interpolation.to_config(),
    }
}

/// Drives an indicatif bar from pipeline progress.
struct CliReporter {
    pb: ProgressBar,
}

impl CliReporter {
    fn new() -> Result<Self> {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg:30} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self { pb })
    }
}

impl ProgressReporter for CliReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.pb.reset();
        self.pb.set_length(total_items.unwrap_or(0) as u64);
        self.pb.set_message(stage.to_string());
    }

    fn advance(&self, items_done: usize) {
        self.pb.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        self.pb.finish();
    }
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        let mut config: PipelineConfig =
            toml::from_str(&contents).context("Invalid pipeline config")?;
        config.input = args.input.clone();
        config.output = args.output.clone();
        debug!(path = %config_path.display(), "Loaded pipeline config");
        config
    } else {
        build_config_from_args(args)
    };
    let target = config.target_rate().context("Invalid pipeline config")?;

    let engines = Engines::reference(
        config.interpolation.search_radius,
        config.interpolation.prefilter_sigma,
    );
    print_run_summary(&config, target, engines.motion.name());

    let reporter = Arc::new(CliReporter::new()?);
    let start = Instant::now();
    let summary = run_pipeline_reported(&config, &engines, reporter.clone())
        .with_context(|| format!("Failed to retime {}", config.input.display()))?;
    reporter.pb.finish_with_message("Done");

    print_retime_report(&summary, start.elapsed());
    println!("\nOutput saved to {}", config.output.display());

    Ok(())
}
