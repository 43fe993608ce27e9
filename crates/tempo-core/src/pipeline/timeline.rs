//! Mapping of output frame indices onto source time.

use crate::frame::FrameRate;

/// Where one output frame falls on the source clip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputPosition {
    /// Output frame index.
    pub index: usize,
    /// First source frame of the surrounding pair.
    pub pair: usize,
    /// Fractional position after `pair`, in [0, 1).
    pub phase: f32,
}

impl OutputPosition {
    /// True when the position lands exactly on source frame `pair`.
    pub fn on_source(&self) -> bool {
        self.phase == 0.0
    }
}

/// Number of output frames for `frame_count` source frames.
pub fn output_count(frame_count: usize, source: FrameRate, target: FrameRate) -> usize {
    if frame_count == 0 {
        return 0;
    }
    let numer = frame_count as u128 * target.num as u128 * source.den as u128;
    let denom = target.den as u128 * source.num as u128;
    ((numer / denom) as usize).max(1)
}

/// Plan every output position.
///
/// Output `j` maps to source time `j * source / target`, computed exactly so
/// that positions meant to hit a source frame never drift off it.
pub fn plan_timeline(frame_count: usize, source: FrameRate, target: FrameRate) -> Vec<OutputPosition> {
    let count = output_count(frame_count, source, target);
    // s = j * (source.num / source.den) / (target.num / target.den)
    let step_num = source.num as u128 * target.den as u128;
    let step_den = source.den as u128 * target.num as u128;

    (0..count)
        .map(|index| {
            let numer = index as u128 * step_num;
            let whole = (numer / step_den) as usize;
            let rem = numer % step_den;
            let pair = whole.min(frame_count.saturating_sub(1));
            let phase = if whole > pair {
                0.0
            } else {
                (rem as f64 / step_den as f64) as f32
            };
            OutputPosition { index, pair, phase }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(num: u32, den: u32) -> FrameRate {
        FrameRate { num, den }
    }

    #[test]
    fn identity_rate_is_all_passthrough() {
        let plan = plan_timeline(5, rate(25, 1), rate(25, 1));
        assert_eq!(plan.len(), 5);
        assert!(plan.iter().all(|p| p.on_source()));
        assert_eq!(plan[3].pair, 3);
    }

    #[test]
    fn ntsc_doubling_stays_exact() {
        let source = rate(30000, 1001);
        let plan = plan_timeline(1000, source, source.doubled().unwrap());
        assert_eq!(plan.len(), 2000);
        assert!(plan.iter().step_by(2).all(|p| p.on_source()));
        assert!(plan.iter().skip(1).step_by(2).all(|p| p.phase == 0.5));
    }
}
