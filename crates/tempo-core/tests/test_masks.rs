mod common;

use approx::assert_abs_diff_eq;

use common::{flat_frame, stripe_frame, textured_frame};
use tempo_core::engine::{
    BlockMaskExtractor, BlockMatchEngine, Direction, MotionEngine, MotionField, MotionVector,
    SearchMode,
};
use tempo_core::masks::{stripe_masks, stripe_response, MaskBuilder, MaskSequence};
use tempo_core::params::{BaseThresholds, BlockGeometry, ThresholdSet};

fn thresholds(block: BlockGeometry) -> ThresholdSet {
    let base = BaseThresholds {
        mask: 80,
        skip: 50,
        occlusion: 40,
        gamma: None,
    };
    ThresholdSet::derive(&base, block)
}

fn uniform_fields(h: usize, w: usize, block: BlockGeometry, sad: f32) -> (MotionField, MotionField) {
    let mut forward = MotionField::zeros(h, w, block, Direction::Forward, SearchMode::Sad);
    let mut backward = MotionField::zeros(h, w, block, Direction::Backward, SearchMode::Sad);
    forward.vectors.fill(MotionVector::new(0.0, 0.0, sad));
    backward.vectors.fill(MotionVector::new(0.0, 0.0, sad));
    (forward, backward)
}

// ---------------------------------------------------------------------------
// Stripe mask
// ---------------------------------------------------------------------------

#[test]
fn test_flat_source_has_no_stripes() {
    let block = BlockGeometry::square(8);
    let flat = flat_frame(64, 64, 0.5);
    assert_eq!(stripe_response(&flat, block).max(), 0.0);
    let stripes = stripe_masks(&flat, block);
    assert_eq!(stripes.fine.max(), 0.0);
    assert_eq!(stripes.wide.max(), 0.0);
}

#[test]
fn test_block_periodic_stripes_are_flagged() {
    let block = BlockGeometry::square(8);
    let stripes = stripe_masks(&stripe_frame(64, 64, 8), block);
    assert_eq!(stripes.fine.dim(), (64, 64));
    assert_eq!(stripes.wide.dim(), (64, 64));
    assert!(stripes.fine.mean() > 128.0, "fine mean {}", stripes.fine.mean());
    assert!(stripes.wide.mean() > 128.0, "wide mean {}", stripes.wide.mean());
}

#[test]
fn test_stripe_response_fires_on_edges_only() {
    let response = stripe_response(&stripe_frame(32, 32, 8), BlockGeometry::square(8));
    // Column 3 is the last bright column before a dark one.
    assert_eq!(response.data[[10, 3]], 255.0);
    assert_eq!(response.data[[10, 1]], 0.0);
}

// ---------------------------------------------------------------------------
// MaskBuilder
// ---------------------------------------------------------------------------

#[test]
fn test_still_flat_pair_gives_clear_masks() {
    let block = BlockGeometry::square(16);
    let source = flat_frame(64, 64, 0.3);
    let engine = BlockMatchEngine::new(4);
    let forward = engine
        .analyze(&source, &source, block, SearchMode::Sad, Direction::Forward)
        .unwrap();
    let backward = engine
        .analyze(&source, &source, block, SearchMode::Sad, Direction::Backward)
        .unwrap();

    let builder = MaskBuilder::new(&BlockMaskExtractor, thresholds(block), true);
    let masks = builder.build(&source, &forward, &backward).unwrap();
    assert_eq!(masks.em.dim(), (64, 64));
    assert_eq!(masks.raw.dim(), (64, 64));
    assert_eq!(masks.em_skip.dim(), (4, 4));
    assert_eq!(masks.em.max(), 0.0);
    assert_eq!(masks.em_skip.max(), 0.0);
    assert_eq!(masks.raw.max(), 0.0);
}

#[test]
fn test_bad_matches_saturate_every_mask() {
    let block = BlockGeometry::square(16);
    let source = flat_frame(64, 64, 0.3);
    let (forward, backward) = uniform_fields(64, 64, block, 1.0);

    let builder = MaskBuilder::new(&BlockMaskExtractor, thresholds(block), true);
    let masks = builder.build(&source, &forward, &backward).unwrap();
    assert_abs_diff_eq!(masks.em.mean(), 255.0, epsilon = 1e-2);
    assert_abs_diff_eq!(masks.raw.mean(), 255.0, epsilon = 1e-2);
    assert!(masks.em_skip.data.iter().all(|&v| v == 255.0));
}

#[test]
fn test_skip_mask_is_binary() {
    let block = BlockGeometry::square(8);
    let a = textured_frame(48, 48, 0.0, 0.0);
    let b = textured_frame(48, 48, 5.0, 3.0);
    let engine = BlockMatchEngine::new(2);
    let forward = engine
        .analyze(&a, &b, block, SearchMode::Sad, Direction::Forward)
        .unwrap();
    let backward = engine
        .analyze(&b, &a, block, SearchMode::Sad, Direction::Backward)
        .unwrap();

    let builder = MaskBuilder::new(&BlockMaskExtractor, thresholds(block), false);
    let masks = builder.build(&a, &forward, &backward).unwrap();
    assert_eq!(masks.em_skip.dim(), (6, 6));
    assert!(masks.em_skip.data.iter().all(|&v| v == 0.0 || v == 255.0));
    assert!(masks.em.data.iter().all(|&v| (0.0..=255.0).contains(&v)));
}

#[test]
fn test_occlusion_toggle_only_adds() {
    let block = BlockGeometry::square(8);
    let (forward, mut backward) = uniform_fields(32, 32, block, 0.0);
    for row in 0..4 {
        for col in 2..4 {
            backward.vectors[[row, col]] = MotionVector::new(8.0, 0.0, 0.0);
        }
    }
    let with = MaskBuilder::new(&BlockMaskExtractor, thresholds(block), true)
        .motion_mask(&forward, &backward)
        .unwrap();
    let without = MaskBuilder::new(&BlockMaskExtractor, thresholds(block), false)
        .motion_mask(&forward, &backward)
        .unwrap();
    assert_eq!(without.max(), 0.0);
    assert!(with.max() > 0.0);
}

// ---------------------------------------------------------------------------
// MaskSequence
// ---------------------------------------------------------------------------

#[test]
fn test_sequence_patches_trailing_slot() {
    let mut seq = MaskSequence::new(4);
    for i in 0..3 {
        seq.insert(i, i * 10);
    }
    assert_eq!(seq.get(3), None);
    assert!(seq.patch_trailing());
    assert_eq!(seq.get(3), Some(&20));
    assert!(!seq.patch_trailing());
}

#[test]
fn test_sequence_without_previous_cannot_patch() {
    let mut single: MaskSequence<u8> = MaskSequence::new(1);
    assert!(!single.patch_trailing());

    let mut gap: MaskSequence<u8> = MaskSequence::new(3);
    gap.insert(0, 1);
    assert!(!gap.patch_trailing());
}

#[test]
fn test_sequence_release_before() {
    let mut seq = MaskSequence::new(5);
    for i in 0..5 {
        seq.insert(i, i);
    }
    seq.release_before(3);
    assert_eq!(seq.get(2), None);
    assert_eq!(seq.get(3), Some(&3));
    assert_eq!(seq.len(), 5);
    // Out-of-range inserts are ignored.
    seq.insert(9, 9);
    assert_eq!(seq.get(9), None);
}
