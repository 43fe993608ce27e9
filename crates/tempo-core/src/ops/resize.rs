use ndarray::Array2;

use crate::consts::EPSILON;
use crate::mask::Mask;

use super::build_rows;

/// Resampling kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResizeKernel {
    /// Triangle filter.
    #[default]
    Bilinear,
    /// Catmull-Rom cubic (b = 0, c = 0.5).
    Bicubic,
}

impl ResizeKernel {
    fn support(self) -> f32 {
        match self {
            Self::Bilinear => 1.0,
            Self::Bicubic => 2.0,
        }
    }

    fn weight(self, x: f32) -> f32 {
        let x = x.abs();
        match self {
            Self::Bilinear => (1.0 - x).max(0.0),
            Self::Bicubic => {
                if x < 1.0 {
                    1.5 * x * x * x - 2.5 * x * x + 1.0
                } else if x < 2.0 {
                    -0.5 * x * x * x + 2.5 * x * x - 4.0 * x + 2.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Source taps contributing to one destination sample.
struct Taps {
    taps: Vec<(usize, f32)>,
}

/// Precompute normalized filter taps for a 1-D resample `src_len -> dst_len`.
///
/// When downscaling, the kernel is stretched by the scale factor so every
/// source sample contributes (area-like behavior instead of point sampling).
fn compute_taps(src_len: usize, dst_len: usize, kernel: ResizeKernel) -> Vec<Taps> {
    let scale = src_len as f32 / dst_len as f32;
    let filter_scale = scale.max(1.0);
    let support = kernel.support() * filter_scale;
    let last = src_len as isize - 1;

    (0..dst_len)
        .map(|i| {
            let center = (i as f32 + 0.5) * scale - 0.5;
            let lo = (center - support).ceil() as isize;
            let hi = (center + support).floor() as isize;

            let mut taps: Vec<(usize, f32)> = Vec::with_capacity((hi - lo + 1).max(1) as usize);
            let mut sum = 0.0f32;
            for j in lo..=hi {
                let w = kernel.weight((j as f32 - center) / filter_scale);
                if w == 0.0 {
                    continue;
                }
                taps.push((j.clamp(0, last) as usize, w));
                sum += w;
            }

            if sum.abs() < EPSILON {
                let nearest = (center.round() as isize).clamp(0, last) as usize;
                return Taps {
                    taps: vec![(nearest, 1.0)],
                };
            }
            for tap in &mut taps {
                tap.1 /= sum;
            }
            Taps { taps }
        })
        .collect()
}

/// Resample `data` to `new_h x new_w` with a separable kernel.
pub fn resize_array(
    data: &Array2<f32>,
    new_h: usize,
    new_w: usize,
    kernel: ResizeKernel,
) -> Array2<f32> {
    let (h, w) = data.dim();
    if (h, w) == (new_h, new_w) {
        return data.clone();
    }
    if h == 0 || w == 0 || new_h == 0 || new_w == 0 {
        return Array2::zeros((new_h, new_w));
    }

    let col_taps = compute_taps(w, new_w, kernel);
    let horizontal = build_rows(h, new_w, |row, mut out| {
        for (col, taps) in col_taps.iter().enumerate() {
            out[col] = taps.taps.iter().map(|&(c, wt)| data[[row, c]] * wt).sum();
        }
    });

    let row_taps = compute_taps(h, new_h, kernel);
    build_rows(new_h, new_w, |row, mut out| {
        let taps = &row_taps[row].taps;
        for col in 0..new_w {
            out[col] = taps.iter().map(|&(r, wt)| horizontal[[r, col]] * wt).sum();
        }
    })
}

/// Resample a mask; bicubic overshoot is clamped into [0, 255].
pub fn resize_mask(mask: &Mask, new_h: usize, new_w: usize, kernel: ResizeKernel) -> Mask {
    Mask::new(resize_array(&mask.data, new_h, new_w, kernel))
}
