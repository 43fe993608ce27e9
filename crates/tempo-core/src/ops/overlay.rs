use ndarray::Zip;

use crate::consts::MASK_MAX;
use crate::error::Result;
use crate::frame::{Frame, VideoFrame};
use crate::mask::Mask;

use super::ensure_same_dim;

/// Lighten-style overlay of `top` onto `base` at `opacity`.
///
/// Per pixel: `base + (max(base, top) - base) * opacity`. Keeps the stronger
/// of the two values, softened by the opacity.
pub fn lighten(base: &Mask, top: &Mask, opacity: f32) -> Result<Mask> {
    ensure_same_dim(base.dim(), top.dim())?;
    let opacity = opacity.clamp(0.0, 1.0);
    let data = Zip::from(&base.data)
        .and(&top.data)
        .map_collect(|&b, &t| b + (b.max(t) - b) * opacity);
    Ok(Mask::new(data))
}

/// Per-pixel absolute difference of two masks.
pub fn abs_diff(a: &Mask, b: &Mask) -> Result<Mask> {
    ensure_same_dim(a.dim(), b.dim())?;
    let data = Zip::from(&a.data)
        .and(&b.data)
        .map_collect(|&x, &y| (x - y).abs());
    Ok(Mask::new(data))
}

/// Mask-driven merge of two masks: `a` where the mask is 0, `b` where it is 255.
pub fn merge_masks(a: &Mask, b: &Mask, mask: &Mask) -> Result<Mask> {
    ensure_same_dim(a.dim(), b.dim())?;
    ensure_same_dim(a.dim(), mask.dim())?;
    let data = Zip::from(&a.data)
        .and(&b.data)
        .and(&mask.data)
        .map_collect(|&x, &y, &m| x + (y - x) * (m / MASK_MAX));
    Ok(Mask::new(data))
}

/// Mask-driven merge of two image planes: `a` where the mask is 0, `b` where it is 255.
pub fn merge_frames(a: &Frame, b: &Frame, mask: &Mask) -> Result<Frame> {
    ensure_same_dim(a.dim(), b.dim())?;
    ensure_same_dim(a.dim(), mask.dim())?;
    let data = Zip::from(&a.data)
        .and(&b.data)
        .and(&mask.data)
        .map_collect(|&x, &y, &m| (x + (y - x) * (m / MASK_MAX)).clamp(0.0, 1.0));
    Ok(Frame::new(data, a.original_bit_depth))
}

/// [`merge_frames`] applied to every plane.
pub fn merge_video(a: &VideoFrame, b: &VideoFrame, mask: &Mask) -> Result<VideoFrame> {
    a.zip_planes(b, |pa, pb| merge_frames(pa, pb, mask))
}
