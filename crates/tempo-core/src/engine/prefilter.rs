use crate::frame::Frame;
use crate::ops::gaussian_blur_array;

use super::Prefilter;

/// Gaussian denoise ahead of motion search.
#[derive(Clone, Copy, Debug)]
pub struct GaussianPrefilter {
    sigma: f32,
}

impl GaussianPrefilter {
    pub fn new(sigma: f32) -> Self {
        Self { sigma }
    }
}

impl Prefilter for GaussianPrefilter {
    fn prefilter(&self, frame: &Frame) -> Frame {
        Frame::new(
            gaussian_blur_array(&frame.data, self.sigma),
            frame.original_bit_depth,
        )
    }
}
