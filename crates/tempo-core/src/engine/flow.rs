//! Bidirectional motion-compensated interpolation.

use ndarray::Array2;

use crate::error::{Result, TempoError};
use crate::frame::Frame;
use crate::ops::{build_rows, ensure_same_dim};

use super::motion::{Direction, MotionField};
use super::Interpolator;

/// Residual floor keeping the confidence weights finite.
const WEIGHT_FLOOR: f32 = 1.0 / 255.0;

/// Reference interpolator.
///
/// Each output pixel is predicted twice, once along the forward field and once
/// along the backward field, and the two predictions are weighted by the
/// inverse of their block matching residual.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlowInterpolator;

/// Bilinear sample with edge clamping.
pub fn bilinear_sample(data: &Array2<f32>, y: f32, x: f32) -> f32 {
    let (h, w) = data.dim();
    let y = y.clamp(0.0, (h - 1) as f32);
    let x = x.clamp(0.0, (w - 1) as f32);

    let y0 = y.floor() as usize;
    let x0 = x.floor() as usize;
    let y1 = (y0 + 1).min(h - 1);
    let x1 = (x0 + 1).min(w - 1);
    let fy = y - y0 as f32;
    let fx = x - x0 as f32;

    data[[y0, x0]] * (1.0 - fx) * (1.0 - fy)
        + data[[y0, x1]] * fx * (1.0 - fy)
        + data[[y1, x0]] * (1.0 - fx) * fy
        + data[[y1, x1]] * fx * fy
}

fn check_field(field: &MotionField, expected: Direction, h: usize, w: usize) -> Result<()> {
    if field.direction != expected {
        return Err(TempoError::Engine {
            stage: "Interpolation",
            message: format!("expected a {expected:?} field, got {:?}", field.direction),
        });
    }
    ensure_same_dim((h, w), (field.height, field.width))
}

impl Interpolator for FlowInterpolator {
    fn interpolate_at(
        &self,
        a: &Frame,
        b: &Frame,
        forward: &MotionField,
        backward: &MotionField,
        t: f32,
    ) -> Result<Frame> {
        ensure_same_dim(a.dim(), b.dim())?;
        let (h, w) = a.dim();
        if h == 0 || w == 0 {
            return Err(TempoError::InvalidDimensions {
                width: w,
                height: h,
            });
        }
        check_field(forward, Direction::Forward, h, w)?;
        check_field(backward, Direction::Backward, h, w)?;

        let t = t.clamp(0.0, 1.0);
        let data = build_rows(h, w, |row, mut out| {
            let y = row as f32;
            for col in 0..w {
                let x = col as f32;

                // Forward: content at A:p moves to B:p+v.
                let vf = forward.sample(y, x);
                let pf = (1.0 - t) * bilinear_sample(&a.data, y - t * vf.dy, x - t * vf.dx)
                    + t * bilinear_sample(&b.data, y + (1.0 - t) * vf.dy, x + (1.0 - t) * vf.dx);

                // Backward: content at B:p came from A:p+v.
                let vb = backward.sample(y, x);
                let pb = (1.0 - t) * bilinear_sample(&a.data, y + t * vb.dy, x + t * vb.dx)
                    + t * bilinear_sample(&b.data, y - (1.0 - t) * vb.dy, x - (1.0 - t) * vb.dx);

                let wf = 1.0 / (vf.sad + WEIGHT_FLOOR);
                let wb = 1.0 / (vb.sad + WEIGHT_FLOOR);
                out[col] = ((wf * pf + wb * pb) / (wf + wb)).clamp(0.0, 1.0);
            }
        });

        Ok(Frame::new(data, a.original_bit_depth))
    }
}
