use thiserror::Error;

/// Invalid configuration, detected once before any frame is processed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown preset: {0} (expected slower, slow, normal or fast)")]
    UnknownPreset(String),

    #[error("Unknown output mode: {0} (expected auto, flow, none, mask, skip, raw, diff or over)")]
    UnknownOutputMode(String),

    #[error("{name} = {value} is out of range [0, 255]")]
    ThresholdOutOfRange { name: &'static str, value: i32 },

    #[error("Skip threshold ({skip}) must be lower than mask threshold ({mask})")]
    InvertedThresholds { mask: i32, skip: i32 },

    #[error("skip_over ({skip_over}) must be greater than blend_over ({blend_over})")]
    InvertedFallbackOrder { blend_over: i32, skip_over: i32 },

    #[error("Gamma must be a positive finite number, got {0}")]
    InvalidGamma(f32),

    #[error("Output mode 'diff' requires a diff pass (preset slower or a distinct secondary block size)")]
    DiffOutputWithoutDiffPass,

    #[error("Invalid block size: {width}x{height}")]
    InvalidBlockSize { width: usize, height: usize },

    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(String),

    #[error("No target frame rate: set target_fps or frame_double")]
    MissingTargetRate,
}

#[derive(Error, Debug)]
pub enum TempoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{stage} failed: {message}")]
    Engine { stage: &'static str, message: String },

    #[error("Frame pair {pair}: {source}")]
    FramePair {
        pair: usize,
        #[source]
        source: Box<TempoError>,
    },

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Empty frame sequence")]
    EmptySequence,
}

impl TempoError {
    /// Attach the source pair index to an engine failure.
    pub fn at_pair(self, pair: usize) -> Self {
        match self {
            e @ TempoError::FramePair { .. } => e,
            e => TempoError::FramePair {
                pair,
                source: Box::new(e),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, TempoError>;
