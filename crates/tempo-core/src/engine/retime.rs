//! Simple retiming: linear cross-fade and frame duplication.

use ndarray::Zip;

use crate::error::Result;
use crate::frame::{Frame, VideoFrame};
use crate::ops::ensure_same_dim;

fn blend_planes(a: &Frame, b: &Frame, t: f32) -> Result<Frame> {
    ensure_same_dim(a.dim(), b.dim())?;
    let data = Zip::from(&a.data)
        .and(&b.data)
        .map_collect(|&x, &y| x * (1.0 - t) + y * t);
    Ok(Frame::new(data, a.original_bit_depth))
}

/// Linear cross-fade at temporal position `t` in [0, 1].
pub fn time_blend(a: &VideoFrame, b: &VideoFrame, t: f32) -> Result<VideoFrame> {
    let t = t.clamp(0.0, 1.0);
    a.zip_planes(b, |pa, pb| blend_planes(pa, pb, t))
}

/// The source frame nearest to `t`: `a` below 0.5, `b` from 0.5 on.
pub fn hard_duplicate(a: &VideoFrame, b: &VideoFrame, t: f32) -> VideoFrame {
    if t < 0.5 {
        a.clone()
    } else {
        b.clone()
    }
}
