pub mod block;
pub mod preset;
pub mod resolve;
pub mod thresholds;

pub use block::BlockGeometry;
pub use preset::{FeatureFlags, Preset};
pub use resolve::{resolve, PassParams, ResolvedParams};
pub use thresholds::{threshold_band, BaseThresholds, ThresholdSet};
