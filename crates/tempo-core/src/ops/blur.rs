use ndarray::Array2;

use crate::consts::{BLUR_APPROX_RADIUS, BLUR_IDENTITY_RADIUS};
use crate::mask::Mask;

use super::build_rows;
use super::resize::{resize_array, ResizeKernel};

/// Low-pass filter of the given radius.
///
/// - below 0.01: identity
/// - below 1.2: direct separable Gaussian with sigma = radius
/// - otherwise: downsample by `floor(radius)`, box blur twice, resize back
pub fn blur(data: &Array2<f32>, radius: f32) -> Array2<f32> {
    if radius.is_nan() || radius < BLUR_IDENTITY_RADIUS {
        return data.clone();
    }
    if radius < BLUR_APPROX_RADIUS {
        return gaussian_blur_array(data, radius);
    }

    let (h, w) = data.dim();
    let factor = (radius.floor() as usize).max(2);
    let small_h = h.div_ceil(factor);
    let small_w = w.div_ceil(factor);
    if small_h < 2 || small_w < 2 {
        return gaussian_blur_array(data, radius);
    }

    let small = resize_array(data, small_h, small_w, ResizeKernel::Bilinear);
    let small = box_blur_array(&box_blur_array(&small, 1), 1);
    resize_array(&small, h, w, ResizeKernel::Bilinear)
}

pub fn blur_mask(mask: &Mask, radius: f32) -> Mask {
    Mask::new(blur(&mask.data, radius))
}

/// Apply Gaussian blur to a raw array using separable 1D convolution.
pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    let kernel = make_gaussian_kernel(sigma);
    let row_pass = convolve_rows(data, &kernel);
    convolve_cols(&row_pass, &kernel)
}

/// Separable mean filter over a `(2 * radius + 1)` window, edges clamped.
pub fn box_blur_array(data: &Array2<f32>, radius: usize) -> Array2<f32> {
    let size = 2 * radius + 1;
    let kernel = vec![1.0 / size as f32; size];
    let row_pass = convolve_rows(data, &kernel);
    convolve_cols(&row_pass, &kernel)
}

fn make_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil().max(1.0) as usize;
    let size = 2 * radius + 1;
    let mut kernel = vec![0.0f32; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

fn convolve_rows(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;

    build_rows(h, w, |row, mut out| {
        for col in 0..w {
            let mut sum = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let src_col =
                    (col as isize + ki as isize - radius as isize).clamp(0, w as isize - 1) as usize;
                sum += data[[row, src_col]] * kv;
            }
            out[col] = sum;
        }
    })
}

fn convolve_cols(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;

    build_rows(h, w, |row, mut out| {
        for col in 0..w {
            let mut sum = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let src_row =
                    (row as isize + ki as isize - radius as isize).clamp(0, h as isize - 1) as usize;
                sum += data[[src_row, col]] * kv;
            }
            out[col] = sum;
        }
    })
}
