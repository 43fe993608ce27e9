use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Speed/quality preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Slower,
    Slow,
    #[default]
    Normal,
    Fast,
}

/// Engine features switched on by a preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Refine vectors with a second pass at half the block size.
    pub use_recalculation: bool,
    /// Use the cosine-transform-aided search cost.
    pub use_dct_search: bool,
    /// Run the secondary pass and reconcile the two.
    pub use_diff_pass: bool,
}

impl Preset {
    pub fn flags(self) -> FeatureFlags {
        let (use_recalculation, use_dct_search, use_diff_pass) = match self {
            Preset::Slower => (true, true, true),
            Preset::Slow => (true, true, false),
            Preset::Normal => (true, false, false),
            Preset::Fast => (false, false, false),
        };
        FeatureFlags {
            use_recalculation,
            use_dct_search,
            use_diff_pass,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slower => write!(f, "slower"),
            Self::Slow => write!(f, "slow"),
            Self::Normal => write!(f, "normal"),
            Self::Fast => write!(f, "fast"),
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slower" => Ok(Self::Slower),
            "slow" => Ok(Self::Slow),
            "normal" | "medium" => Ok(Self::Normal),
            "fast" => Ok(Self::Fast),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}
