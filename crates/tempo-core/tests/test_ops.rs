use approx::assert_abs_diff_eq;
use ndarray::Array2;

use tempo_core::frame::{Frame, VideoFrame};
use tempo_core::mask::Mask;
use tempo_core::ops::{
    abs_diff, binarize_mask, blur, blur_mask, expand, expand_mask, inpand, inpand_mask, lighten,
    merge_frames, merge_masks, merge_video, resize_array, resize_mask, ResizeKernel,
};

fn point_mask(h: usize, w: usize, y: usize, x: usize) -> Mask {
    let mut data = Array2::<f32>::zeros((h, w));
    data[[y, x]] = 255.0;
    Mask::new(data)
}

// ---------------------------------------------------------------------------
// Mask clamping
// ---------------------------------------------------------------------------

#[test]
fn test_mask_new_clamps_and_drops_nan() {
    let data = Array2::from_shape_vec((1, 4), vec![-5.0, 300.0, f32::NAN, 12.0]).unwrap();
    let mask = Mask::new(data);
    assert_eq!(mask.data.as_slice().unwrap(), &[0.0, 255.0, 0.0, 12.0]);
}

// ---------------------------------------------------------------------------
// Morphology
// ---------------------------------------------------------------------------

#[test]
fn test_expand_uses_circular_element() {
    let out = expand_mask(&point_mask(7, 7, 3, 3), 1.0);
    // Radius 1: the four direct neighbors, not the diagonals.
    assert_eq!(out.data[[2, 3]], 255.0);
    assert_eq!(out.data[[4, 3]], 255.0);
    assert_eq!(out.data[[3, 2]], 255.0);
    assert_eq!(out.data[[3, 4]], 255.0);
    assert_eq!(out.data[[2, 2]], 0.0);
    assert_eq!(out.data[[4, 4]], 0.0);

    let wide = expand_mask(&point_mask(9, 9, 4, 4), 2.0);
    assert_eq!(wide.data[[3, 3]], 255.0);
    assert_eq!(wide.data[[2, 4]], 255.0);
    assert_eq!(wide.data[[2, 2]], 0.0);
}

#[test]
fn test_inpand_removes_isolated_pixel() {
    let out = inpand_mask(&point_mask(5, 5, 2, 2), 1.0);
    assert_eq!(out.max(), 0.0);
}

#[test]
fn test_inpand_keeps_solid_region() {
    let solid = Mask::filled(6, 6, 200.0);
    let out = inpand_mask(&solid, 1.0);
    assert!(out.data.iter().all(|&v| v == 200.0));
}

#[test]
fn test_zero_radius_morphology_is_identity() {
    let data = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as f32);
    assert_eq!(expand(&data, 0.0), data);
    assert_eq!(inpand(&data, 0.5), data);
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

#[test]
fn test_binarize_is_inclusive() {
    let data = Array2::from_shape_vec((1, 3), vec![59.0, 60.0, 61.0]).unwrap();
    let out = binarize_mask(&Mask::new(data), 60.0);
    assert_eq!(out.data.as_slice().unwrap(), &[0.0, 255.0, 255.0]);
}

// ---------------------------------------------------------------------------
// Overlay and merge
// ---------------------------------------------------------------------------

#[test]
fn test_lighten_keeps_stronger_value() {
    let base = Mask::filled(2, 2, 100.0);
    let top = Mask::filled(2, 2, 200.0);
    let full = lighten(&base, &top, 1.0).unwrap();
    assert_abs_diff_eq!(full.mean(), 200.0, epsilon = 1e-4);
    let partial = lighten(&base, &top, 0.6).unwrap();
    assert_abs_diff_eq!(partial.mean(), 160.0, epsilon = 1e-4);
    // A darker top never darkens the base.
    let darker = lighten(&top, &base, 1.0).unwrap();
    assert_abs_diff_eq!(darker.mean(), 200.0, epsilon = 1e-4);
}

#[test]
fn test_lighten_chain_stays_in_range() {
    let mut acc = Mask::filled(3, 3, 250.0);
    for _ in 0..10 {
        acc = lighten(&acc, &Mask::filled(3, 3, 255.0), 0.9).unwrap();
    }
    assert!(acc.data.iter().all(|&v| (0.0..=255.0).contains(&v)));
}

#[test]
fn test_lighten_rejects_mismatched_masks() {
    assert!(lighten(&Mask::zeros(2, 2), &Mask::zeros(3, 2), 0.5).is_err());
}

#[test]
fn test_merge_endpoints() {
    let a = Mask::filled(2, 2, 10.0);
    let b = Mask::filled(2, 2, 210.0);
    assert_abs_diff_eq!(merge_masks(&a, &b, &Mask::zeros(2, 2)).unwrap().mean(), 10.0);
    assert_abs_diff_eq!(
        merge_masks(&a, &b, &Mask::filled(2, 2, 255.0)).unwrap().mean(),
        210.0,
        epsilon = 1e-4
    );
    assert_abs_diff_eq!(
        merge_masks(&a, &b, &Mask::filled(2, 2, 127.5)).unwrap().mean(),
        110.0,
        epsilon = 1e-3
    );
}

#[test]
fn test_merge_frames_clamps_to_unit_range() {
    let a = Frame::new(Array2::from_elem((2, 2), 0.2), 8);
    let b = Frame::new(Array2::from_elem((2, 2), 0.9), 8);
    let out = merge_frames(&a, &b, &Mask::filled(2, 2, 255.0)).unwrap();
    assert!(out.data.iter().all(|&v| (v - 0.9).abs() < 1e-6));
}

#[test]
fn test_merge_video_promotes_mono_to_color() {
    let mono = VideoFrame::Mono(Frame::new(Array2::from_elem((2, 2), 0.5), 8));
    let color = VideoFrame::Color(mono.to_color());
    let out = merge_video(&mono, &color, &Mask::zeros(2, 2)).unwrap();
    assert!(out.is_color());
}

#[test]
fn test_abs_diff_is_symmetric() {
    let a = Mask::filled(2, 2, 30.0);
    let b = Mask::filled(2, 2, 100.0);
    assert_eq!(abs_diff(&a, &b).unwrap(), abs_diff(&b, &a).unwrap());
    assert_abs_diff_eq!(abs_diff(&a, &b).unwrap().mean(), 70.0);
}

// ---------------------------------------------------------------------------
// Blur
// ---------------------------------------------------------------------------

#[test]
fn test_blur_identity_below_threshold() {
    let data = Array2::from_shape_fn((8, 8), |(r, c)| ((r + c) % 3) as f32);
    assert_eq!(blur(&data, 0.005), data);
    assert_eq!(blur(&data, f32::NAN), data);
}

#[test]
fn test_blur_preserves_constant_image() {
    let data = Array2::from_elem((32, 32), 77.0f32);
    for radius in [0.6, 1.0, 1.5, 2.5, 3.0] {
        let out = blur(&data, radius);
        assert_eq!(out.dim(), (32, 32));
        for &v in out.iter() {
            assert_abs_diff_eq!(v, 77.0, epsilon = 1e-3);
        }
    }
}

#[test]
fn test_blur_roughly_preserves_mean() {
    let data = Array2::from_shape_fn((40, 40), |(r, c)| {
        if (r / 5 + c / 5) % 2 == 0 {
            255.0
        } else {
            0.0
        }
    });
    let mean_in = data.mean().unwrap();
    for radius in [0.6, 2.5] {
        let mean_out = blur(&data, radius).mean().unwrap();
        assert!((mean_in - mean_out).abs() < 10.0, "radius {radius}: {mean_in} vs {mean_out}");
    }
}

#[test]
fn test_blur_softens_edges() {
    let mask = point_mask(16, 16, 8, 8);
    let out = blur_mask(&mask, 1.0);
    assert!(out.data[[8, 8]] < 255.0);
    assert!(out.data[[8, 9]] > 0.0);
}

#[test]
fn test_tiny_image_falls_back_to_direct_blur() {
    let data = Array2::from_elem((3, 3), 5.0f32);
    let out = blur(&data, 2.5);
    assert_eq!(out.dim(), (3, 3));
    assert_abs_diff_eq!(out[[1, 1]], 5.0, epsilon = 1e-4);
}

// ---------------------------------------------------------------------------
// Resize
// ---------------------------------------------------------------------------

#[test]
fn test_resize_constant_image() {
    let data = Array2::from_elem((30, 40), 0.25f32);
    for kernel in [ResizeKernel::Bilinear, ResizeKernel::Bicubic] {
        for (h, w) in [(15, 20), (4, 5), (60, 80), (31, 17)] {
            let out = resize_array(&data, h, w, kernel);
            assert_eq!(out.dim(), (h, w));
            for &v in out.iter() {
                assert_abs_diff_eq!(v, 0.25, epsilon = 1e-4);
            }
        }
    }
}

#[test]
fn test_resize_same_size_is_identity() {
    let data = Array2::from_shape_fn((5, 6), |(r, c)| (r * 6 + c) as f32);
    assert_eq!(resize_array(&data, 5, 6, ResizeKernel::Bicubic), data);
}

#[test]
fn test_resize_mask_clamps_overshoot() {
    let mut data = Array2::<f32>::zeros((4, 4));
    data[[1, 1]] = 255.0;
    data[[2, 2]] = 255.0;
    let out = resize_mask(&Mask::new(data), 13, 13, ResizeKernel::Bicubic);
    assert!(out.data.iter().all(|&v| (0.0..=255.0).contains(&v)));
}
