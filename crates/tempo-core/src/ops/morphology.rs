use ndarray::Array2;

use crate::mask::Mask;

use super::build_rows;

/// Offsets `(dr, dc)` of a circular structuring element of the given radius.
fn disc(radius: f32) -> Vec<(isize, isize)> {
    let r = radius.max(0.0);
    let reach = r.floor() as isize;
    let r2 = r * r;
    let mut offsets = Vec::new();
    for dr in -reach..=reach {
        for dc in -reach..=reach {
            if (dr * dr + dc * dc) as f32 <= r2 {
                offsets.push((dr, dc));
            }
        }
    }
    offsets
}

/// Apply a grayscale rank filter over the disc; out-of-bounds neighbors are ignored.
fn rank_filter(data: &Array2<f32>, radius: f32, pick: fn(f32, f32) -> f32) -> Array2<f32> {
    let (h, w) = data.dim();
    let offsets = disc(radius);
    if offsets.len() <= 1 {
        return data.clone();
    }

    build_rows(h, w, |row, mut out| {
        for col in 0..w {
            let mut acc = data[[row, col]];
            for &(dr, dc) in &offsets {
                let nr = row as isize + dr;
                let nc = col as isize + dc;
                if nr >= 0 && nr < h as isize && nc >= 0 && nc < w as isize {
                    acc = pick(acc, data[[nr as usize, nc as usize]]);
                }
            }
            out[col] = acc;
        }
    })
}

/// Morphological expand (grayscale dilation): each pixel becomes the maximum
/// over a disc of `radius` around it.
pub fn expand(data: &Array2<f32>, radius: f32) -> Array2<f32> {
    rank_filter(data, radius, f32::max)
}

/// Morphological inpand (grayscale erosion): each pixel becomes the minimum
/// over a disc of `radius` around it.
pub fn inpand(data: &Array2<f32>, radius: f32) -> Array2<f32> {
    rank_filter(data, radius, f32::min)
}

pub fn expand_mask(mask: &Mask, radius: f32) -> Mask {
    Mask::new(expand(&mask.data, radius))
}

pub fn inpand_mask(mask: &Mask, radius: f32) -> Mask {
    Mask::new(inpand(&mask.data, radius))
}
