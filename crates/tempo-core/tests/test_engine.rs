mod common;

use approx::assert_abs_diff_eq;
use ndarray::Array2;

use common::{flat_frame, mono, textured_frame};
use tempo_core::engine::{
    hard_duplicate, time_blend, BlockMaskExtractor, BlockMatchEngine, Direction, Engines,
    FlowInterpolator, GaussianPrefilter, Interpolator, MaskExtractor, MaskKind, MaskParams,
    MotionEngine, MotionField, MotionVector, Prefilter, SearchMode,
};
use tempo_core::error::TempoError;
use tempo_core::params::BlockGeometry;

fn zero_field(h: usize, w: usize, direction: Direction) -> MotionField {
    MotionField::zeros(h, w, BlockGeometry::square(8), direction, SearchMode::Sad)
}

// ---------------------------------------------------------------------------
// Block matching
// ---------------------------------------------------------------------------

#[test]
fn test_block_match_recovers_translation() {
    let a = textured_frame(64, 64, 0.0, 0.0);
    let b = textured_frame(64, 64, 3.0, 2.0);
    let engine = BlockMatchEngine::new(4);
    let field = engine
        .analyze(&a, &b, BlockGeometry::square(16), SearchMode::Sad, Direction::Forward)
        .unwrap();

    assert_eq!(field.grid_dim(), (4, 4));
    assert_eq!(field.direction, Direction::Forward);
    // Blocks whose match stays inside the frame.
    for row in 0..=2 {
        for col in 0..=2 {
            let v = field.vectors[[row, col]];
            assert_eq!((v.dx, v.dy), (3.0, 2.0), "block ({row}, {col})");
            assert!(v.sad < 1e-5);
        }
    }
}

#[test]
fn test_block_match_backward_points_back() {
    let a = textured_frame(64, 64, 0.0, 0.0);
    let b = textured_frame(64, 64, 3.0, 2.0);
    let engine = BlockMatchEngine::new(4);
    let field = engine
        .analyze(&b, &a, BlockGeometry::square(16), SearchMode::Sad, Direction::Backward)
        .unwrap();
    for row in 1..=3 {
        for col in 1..=3 {
            let v = field.vectors[[row, col]];
            assert_eq!((v.dx, v.dy), (-3.0, -2.0), "block ({row}, {col})");
        }
    }
}

#[test]
fn test_block_match_flat_frames_have_zero_motion() {
    let flat = flat_frame(32, 32, 0.4);
    let field = BlockMatchEngine::new(8)
        .analyze(&flat, &flat, BlockGeometry::square(8), SearchMode::Dct, Direction::Forward)
        .unwrap();
    assert!(field.vectors.iter().all(|v| *v == MotionVector::default()));
}

#[test]
fn test_refine_keeps_motion_at_smaller_blocks() {
    let a = textured_frame(64, 64, 0.0, 0.0);
    let b = textured_frame(64, 64, 3.0, 2.0);
    let engine = BlockMatchEngine::new(4);
    let coarse = engine
        .analyze(&a, &b, BlockGeometry::square(16), SearchMode::Sad, Direction::Forward)
        .unwrap();
    let fine = engine.refine(&coarse, &a, &b, BlockGeometry::square(8)).unwrap();

    assert_eq!(fine.grid_dim(), (8, 8));
    assert_eq!(fine.block, BlockGeometry::square(8));
    assert_eq!(fine.search, SearchMode::Sad);
    for row in 1..=4 {
        for col in 1..=4 {
            let v = fine.vectors[[row, col]];
            assert_eq!((v.dx, v.dy), (3.0, 2.0), "block ({row}, {col})");
        }
    }
}

#[test]
fn test_block_match_rejects_mismatched_frames() {
    let engine = BlockMatchEngine::new(2);
    let result = engine.analyze(
        &flat_frame(16, 16, 0.0),
        &flat_frame(16, 8, 0.0),
        BlockGeometry::square(8),
        SearchMode::Sad,
        Direction::Forward,
    );
    assert!(matches!(result, Err(TempoError::DimensionMismatch { .. })));
}

// ---------------------------------------------------------------------------
// Motion field
// ---------------------------------------------------------------------------

#[test]
fn test_field_sample_of_uniform_field() {
    let mut field = zero_field(32, 32, Direction::Forward);
    field.vectors.fill(MotionVector::new(1.5, -2.0, 0.1));
    let v = field.sample(13.0, 27.0);
    assert_abs_diff_eq!(v.dx, 1.5, epsilon = 1e-6);
    assert_abs_diff_eq!(v.dy, -2.0, epsilon = 1e-6);
    assert_abs_diff_eq!(v.sad, 0.1, epsilon = 1e-6);
}

#[test]
fn test_search_mode_other() {
    assert_eq!(SearchMode::Sad.other(), SearchMode::Dct);
    assert_eq!(SearchMode::Dct.other(), SearchMode::Sad);
    assert_eq!(SearchMode::Dct.to_string(), "DCT");
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

#[test]
fn test_interpolation_endpoints_with_zero_motion() {
    let a = textured_frame(24, 24, 0.0, 0.0);
    let b = textured_frame(24, 24, 2.0, 0.0);
    let fwd = zero_field(24, 24, Direction::Forward);
    let bwd = zero_field(24, 24, Direction::Backward);

    let at0 = FlowInterpolator.interpolate_at(&a, &b, &fwd, &bwd, 0.0).unwrap();
    let at1 = FlowInterpolator.interpolate_at(&a, &b, &fwd, &bwd, 1.0).unwrap();
    for (x, y) in at0.data.iter().zip(a.data.iter()) {
        assert_abs_diff_eq!(*x, *y, epsilon = 1e-5);
    }
    for (x, y) in at1.data.iter().zip(b.data.iter()) {
        assert_abs_diff_eq!(*x, *y, epsilon = 1e-5);
    }
}

#[test]
fn test_zero_motion_midpoint_is_cross_fade() {
    let a = flat_frame(16, 16, 0.2);
    let b = flat_frame(16, 16, 0.6);
    let out = FlowInterpolator
        .interpolate_at(
            &a,
            &b,
            &zero_field(16, 16, Direction::Forward),
            &zero_field(16, 16, Direction::Backward),
            0.5,
        )
        .unwrap();
    for &v in out.data.iter() {
        assert_abs_diff_eq!(v, 0.4, epsilon = 1e-5);
    }
}

#[test]
fn test_interpolation_follows_motion() {
    let a = textured_frame(64, 64, 0.0, 0.0);
    let b = textured_frame(64, 64, 4.0, 0.0);
    let engine = BlockMatchEngine::new(6);
    let block = BlockGeometry::square(16);
    let fwd = engine
        .analyze(&a, &b, block, SearchMode::Sad, Direction::Forward)
        .unwrap();
    let bwd = engine
        .analyze(&b, &a, block, SearchMode::Sad, Direction::Backward)
        .unwrap();
    let mid = FlowInterpolator.interpolate_at(&a, &b, &fwd, &bwd, 0.5).unwrap();
    let expected = textured_frame(64, 64, 2.0, 0.0);

    // Compare away from the borders, where both fields are reliable.
    let mut err = 0.0f32;
    let mut blend_err = 0.0f32;
    for r in 20..44 {
        for c in 20..44 {
            err += (mid.data[[r, c]] - expected.data[[r, c]]).abs();
            let blend = 0.5 * (a.data[[r, c]] + b.data[[r, c]]);
            blend_err += (blend - expected.data[[r, c]]).abs();
        }
    }
    assert!(err < blend_err, "flow {err} vs blend {blend_err}");
}

#[test]
fn test_interpolation_checks_field_direction() {
    let a = flat_frame(16, 16, 0.0);
    let fwd = zero_field(16, 16, Direction::Forward);
    let result = FlowInterpolator.interpolate_at(&a, &a, &fwd, &fwd, 0.5);
    assert!(matches!(result, Err(TempoError::Engine { .. })));
}

// ---------------------------------------------------------------------------
// Mask extraction
// ---------------------------------------------------------------------------

#[test]
fn test_sad_mask_saturates_at_scale() {
    let mut field = zero_field(32, 32, Direction::Backward);
    field.vectors.fill(MotionVector::new(0.0, 0.0, 1.0));
    let params = MaskParams {
        kind: MaskKind::Sad,
        scale: 16.0,
        gamma: 1.0,
    };
    let mask = BlockMaskExtractor.extract_mask(&field, params).unwrap();
    assert_eq!(mask.dim(), (32, 32));
    assert!(mask.data.iter().all(|&v| (v - 255.0).abs() < 1e-3));
}

#[test]
fn test_sad_mask_scales_linearly_below_saturation() {
    let mut field = zero_field(16, 16, Direction::Forward);
    // 8 levels against a scale of 16.
    field.vectors.fill(MotionVector::new(0.0, 0.0, 8.0 / 255.0));
    let params = MaskParams {
        kind: MaskKind::Sad,
        scale: 16.0,
        gamma: 1.0,
    };
    let mask = BlockMaskExtractor.extract_mask(&field, params).unwrap();
    assert_abs_diff_eq!(mask.mean(), 127.5, epsilon = 1e-2);
}

#[test]
fn test_occlusion_mask_marks_vector_discontinuities() {
    let mut field = zero_field(32, 32, Direction::Backward);
    assert_eq!(field.grid_dim(), (4, 4));
    for row in 0..4 {
        for col in 2..4 {
            field.vectors[[row, col]] = MotionVector::new(8.0, 0.0, 0.0);
        }
    }
    let params = MaskParams {
        kind: MaskKind::Occlusion,
        scale: 40.0,
        gamma: 1.0,
    };
    let mask = BlockMaskExtractor.extract_mask(&field, params).unwrap();
    // Boundary between block columns 1 and 2 lights up; the far edges stay clear.
    assert!(mask.data[[12, 15]] > 200.0);
    assert_abs_diff_eq!(mask.data[[12, 0]], 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(mask.data[[12, 31]], 0.0, epsilon = 1e-3);
}

#[test]
fn test_mask_extractor_rejects_bad_params() {
    let field = zero_field(16, 16, Direction::Forward);
    for (scale, gamma) in [(0.0, 1.0), (-1.0, 1.0), (16.0, 0.0), (f32::NAN, 1.0)] {
        let params = MaskParams {
            kind: MaskKind::Sad,
            scale,
            gamma,
        };
        assert!(matches!(
            BlockMaskExtractor.extract_mask(&field, params),
            Err(TempoError::Engine { .. })
        ));
    }
}

// ---------------------------------------------------------------------------
// Retime helpers and prefilter
// ---------------------------------------------------------------------------

#[test]
fn test_time_blend_weights() {
    let a = mono(flat_frame(4, 4, 0.0));
    let b = mono(flat_frame(4, 4, 1.0));
    let out = time_blend(&a, &b, 0.25).unwrap();
    let tempo_core::frame::VideoFrame::Mono(plane) = out else {
        panic!("expected mono output");
    };
    assert!(plane.data.iter().all(|&v| (v - 0.25).abs() < 1e-6));
}

#[test]
fn test_hard_duplicate_picks_nearest() {
    let a = mono(flat_frame(2, 2, 0.0));
    let b = mono(flat_frame(2, 2, 1.0));
    assert_eq!(hard_duplicate(&a, &b, 0.49), a);
    assert_eq!(hard_duplicate(&a, &b, 0.5), b);
}

#[test]
fn test_gaussian_prefilter_smooths() {
    let mut data = Array2::<f32>::zeros((9, 9));
    data[[4, 4]] = 1.0;
    let frame = tempo_core::frame::Frame::new(data, 8);
    let out = GaussianPrefilter::new(1.0).prefilter(&frame);
    assert!(out.data[[4, 4]] < 1.0);
    assert!(out.data[[4, 5]] > 0.0);
    assert_abs_diff_eq!(out.data.sum(), 1.0, epsilon = 1e-4);
}

#[test]
fn test_reference_engines_prefilter_toggle() {
    assert!(Engines::reference(8, None).prefilter.is_none());
    assert!(Engines::reference(8, Some(0.0)).prefilter.is_none());
    let engines = Engines::reference(8, Some(1.5));
    assert!(engines.prefilter.is_some());
    assert_eq!(engines.motion.name(), "CPU block matching");
}
