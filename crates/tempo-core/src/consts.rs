/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum work item count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-10;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Largest value a mask pixel may hold.
pub const MASK_MAX: f32 = 255.0;

// ---------------------------------------------------------------------------
// Block geometry
// ---------------------------------------------------------------------------

/// Block side lengths accepted by the motion engine, ascending.
pub const SUPPORTED_BLOCK_SIDES: [usize; 8] = [4, 8, 12, 16, 24, 32, 48, 64];

/// Default square block side by height-equivalent, as `(max_height, side)`.
/// The last bucket is open-ended.
pub const BLOCK_SIZE_BUCKETS: [(usize, usize); 5] = [
    (480, 8),
    (720, 12),
    (1080, 16),
    (1440, 24),
    (usize::MAX, 32),
];

/// One row of the per-block-size threshold adjustment table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdBand {
    /// Inclusive upper bound on `max(block_width, block_height)`.
    pub max_side: usize,
    pub mask_offset: i32,
    pub skip_offset: i32,
    pub occlusion_offset: i32,
    pub gamma: f32,
}

const fn band(
    max_side: usize,
    mask_offset: i32,
    skip_offset: i32,
    occlusion_offset: i32,
    gamma: f32,
) -> ThresholdBand {
    ThresholdBand {
        max_side,
        mask_offset,
        skip_offset,
        occlusion_offset,
        gamma,
    }
}

/// Threshold bands keyed on the larger block side. Offsets never decrease with
/// block size, and `mask_offset >= skip_offset` in every row.
pub const THRESHOLD_BANDS: [ThresholdBand; 8] = [
    band(4, -24, -28, -12, 2.0),
    band(8, -12, -16, -6, 1.6),
    band(12, -6, -8, -3, 1.4),
    band(16, 0, 0, 0, 1.2),
    band(24, 8, 4, 4, 1.1),
    band(32, 16, 8, 8, 1.0),
    band(48, 24, 12, 12, 0.9),
    band(64, 32, 16, 16, 0.8),
];

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_MASK_THRESHOLD: i32 = 80;
pub const DEFAULT_SKIP_THRESHOLD: i32 = 50;
pub const DEFAULT_OCCLUSION_THRESHOLD: i32 = 40;
pub const DEFAULT_BLEND_OVER: i32 = 50;
pub const DEFAULT_SKIP_OVER: i32 = 120;

/// Search radius (pixels) of the reference block matcher.
pub const DEFAULT_SEARCH_RADIUS: usize = 8;

/// Search radius around the seed vector when refining to a smaller block.
pub const REFINE_SEARCH_RADIUS: isize = 2;

/// SAD penalty (0..1 scale, per pixel) added to every non-zero candidate vector.
pub const ZERO_VECTOR_BIAS: f32 = 1.0 / 1024.0;

// ---------------------------------------------------------------------------
// Mask construction
// ---------------------------------------------------------------------------

/// Extractor scale for the "maximal strength" SAD mask: a mean absolute
/// difference of this many 8-bit levels maps to full white.
pub const SAD_MASK_MAX_STRENGTH: f32 = 16.0;

pub const FORWARD_BACKWARD_OPACITY: f32 = 0.6;
pub const OCCLUSION_OPACITY: f32 = 0.4;
pub const RAW_STRIPE_OPACITY: f32 = 0.5;
pub const EM_STRIPE_OPACITY: f32 = 1.0;

pub const OCCLUSION_INPAND_RADIUS: f32 = 1.0;
pub const GRID_EXPAND_RADIUS: f32 = 1.0;
pub const EM_BLUR_RADIUS: f32 = 0.6;

/// Gain applied to the block-periodic texture measure of the stripe mask.
pub const STRIPE_GAIN: f32 = 4.0;
pub const STRIPE_PRE_BLUR: f32 = 1.0;
pub const STRIPE_BINARIZE: f32 = 40.0;
pub const STRIPE_EXPAND_RADIUS: f32 = 1.0;
pub const STRIPE_POST_BLUR: f32 = 1.5;
pub const STRIPE_WIDE_EXPAND_RADIUS: f32 = 5.0;
pub const STRIPE_WIDE_BLUR: f32 = 3.0;

// ---------------------------------------------------------------------------
// Diff pass
// ---------------------------------------------------------------------------

pub const LOCALITY_EXPAND_RADIUS: f32 = 2.0;
pub const LOCALITY_BINARIZE: f32 = 60.0;
pub const LOCALITY_BLUR: f32 = 2.5;

// ---------------------------------------------------------------------------
// Blur approximation
// ---------------------------------------------------------------------------

/// Radius below which blur is the identity.
pub const BLUR_IDENTITY_RADIUS: f32 = 0.01;

/// Radius from which blur switches to downsample + box blur + resize.
pub const BLUR_APPROX_RADIUS: f32 = 1.2;

// ---------------------------------------------------------------------------
// Debug overlay
// ---------------------------------------------------------------------------

/// Height in pixels of the statistics bar drawn by the debug overlay.
pub const DEBUG_BAR_HEIGHT: usize = 6;

/// Strength of the cyan tint in the `over` view.
pub const OVERLAY_TINT: f32 = 0.6;

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Number of source pairs analysed and composited per streaming batch.
pub const STREAMING_BATCH_SIZE: usize = 16;
