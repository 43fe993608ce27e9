use ndarray::Array2;

use crate::consts::MASK_MAX;
use crate::frame::Frame;

/// Single-channel confidence image. Every value lies in [0, 255]; higher
/// means "interpolation is likely wrong here".
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    /// Row-major, shape = (height, width)
    pub data: Array2<f32>,
}

impl Mask {
    /// Wrap raw values, clamping them into [0, 255].
    pub fn new(data: Array2<f32>) -> Self {
        Self {
            data: data.mapv(clamp_mask),
        }
    }

    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            data: Array2::zeros((height, width)),
        }
    }

    pub fn filled(height: usize, width: usize, value: f32) -> Self {
        Self {
            data: Array2::from_elem((height, width), clamp_mask(value)),
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Mean intensity, 0.0 for an empty mask.
    pub fn mean(&self) -> f32 {
        self.data.mean().unwrap_or(0.0)
    }

    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(0.0, f32::max)
    }

    /// View as an image plane in [0, 1].
    pub fn to_frame(&self) -> Frame {
        Frame::new(self.data.mapv(|v| v / MASK_MAX), 8)
    }
}

pub(crate) fn clamp_mask(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, MASK_MAX)
    }
}
