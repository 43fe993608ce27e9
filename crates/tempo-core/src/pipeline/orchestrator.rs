use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::composite::{Candidates, FrameCompositor};
use crate::consts::{PARALLEL_FRAME_THRESHOLD, STREAMING_BATCH_SIZE};
use crate::diff::{DiffOutcome, DiffReconciler};
use crate::engine::{hard_duplicate, time_blend, Engines};
use crate::error::{Result, TempoError};
use crate::frame::{Frame, FrameRate, VideoFrame};
use crate::io::image_io::{frame_path, load_sequence, save_video_frame};
use crate::mask::Mask;
use crate::masks::{MaskSequence, MaskSet};
use crate::ops::ensure_same_dim;
use crate::output::{OutputSelector, StageViews};
use crate::params::{resolve, ResolvedParams};
use crate::pass::PassAnalysis;

use super::config::{InterpolationConfig, PipelineConfig};
use super::timeline::{plan_timeline, OutputPosition};
use super::types::{
    FrameReport, NoOpReporter, PipelineStage, ProgressReporter, RetimeOutput, RetimeSummary,
};

/// Everything computed for one source pair.
#[derive(Clone, Debug)]
struct PairAnalysis {
    primary: PassAnalysis,
    diff: Option<DiffOutcome>,
}

impl PairAnalysis {
    fn em_final(&self) -> &Mask {
        self.diff.as_ref().map_or(&self.primary.masks.em, |d| &d.em)
    }
}

/// Map `f` over `items`, in parallel once there are enough of them.
/// Output order follows input order; the first error wins.
fn map_collect<I, T, F>(items: &[I], f: F) -> Result<Vec<T>>
where
    I: Sync,
    T: Send,
    F: Fn(&I) -> Result<T> + Sync + Send,
{
    if items.len() >= PARALLEL_FRAME_THRESHOLD {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}

struct Retimer<'a> {
    frames: &'a [VideoFrame],
    params: &'a ResolvedParams,
    engines: &'a Engines,
    compositor: FrameCompositor,
    selector: OutputSelector,
    /// Unfiltered luma, empty when no analysis runs.
    lumas: Vec<Frame>,
    /// Prefiltered luma the motion search sees, when a prefilter is set.
    filtered: Option<Vec<Frame>>,
}

impl<'a> Retimer<'a> {
    fn new(
        frames: &'a [VideoFrame],
        params: &'a ResolvedParams,
        engines: &'a Engines,
        reporter: &Arc<dyn ProgressReporter>,
    ) -> Result<Self> {
        let needs_analysis = params.output.needs_analysis();
        let lumas = if needs_analysis {
            map_collect(frames, |f| Ok(f.luma()))?
        } else {
            Vec::new()
        };

        let filtered = match (&engines.prefilter, needs_analysis) {
            (Some(prefilter), true) => {
                reporter.begin_stage(PipelineStage::Prefiltering, Some(lumas.len()));
                let done = AtomicUsize::new(0);
                let filtered = map_collect(&lumas, |luma| {
                    let out = prefilter.prefilter(luma);
                    reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
                    Ok(out)
                })?;
                reporter.finish_stage();
                Some(filtered)
            }
            _ => None,
        };

        Ok(Self {
            frames,
            params,
            engines,
            compositor: FrameCompositor::new(params.policy),
            selector: OutputSelector::new(params.output, params.debug, params.policy),
            lumas,
            filtered,
        })
    }

    fn analysis_frame(&self, index: usize) -> &Frame {
        match &self.filtered {
            Some(filtered) => &filtered[index],
            None => &self.lumas[index],
        }
    }

    fn analyze_pair(&self, pair: usize) -> Result<PairAnalysis> {
        let (a, b) = (self.analysis_frame(pair), self.analysis_frame(pair + 1));
        let source = &self.lumas[pair];
        let primary = PassAnalysis::run(
            self.engines,
            &self.params.primary,
            self.params.occlusion,
            a,
            b,
            source,
        )?;
        let diff = match self.params.secondary {
            Some(secondary) => Some(
                DiffReconciler::new(
                    self.engines,
                    secondary,
                    self.params.occlusion,
                    self.params.primary.analysis_block(),
                )
                .reconcile(&primary, a, b, source)?,
            ),
            None => None,
        };
        Ok(PairAnalysis { primary, diff })
    }

    /// Produce the output frame for `pos`, plus its decision when composited.
    fn render(
        &self,
        pos: &OutputPosition,
        sequence: &MaskSequence<PairAnalysis>,
    ) -> Result<(VideoFrame, Option<FrameReport>)> {
        let n = self.frames.len();
        let a = &self.frames[pos.pair];
        if pos.on_source() {
            return Ok((self.selector.passthrough(a), None));
        }

        let trailing = pos.pair + 1 >= n;
        let b = if trailing { a } else { &self.frames[pos.pair + 1] };
        let t = pos.phase;
        let blended = time_blend(a, b, t)?;
        if !self.params.output.needs_analysis() {
            return Ok((blended, None));
        }
        let duplicated = hard_duplicate(a, b, t);

        let (h, w) = a.dim();
        let analysis = sequence.get(pos.pair);
        let zeros;
        let (masks, em_final, locality) = match analysis {
            Some(pair) => (
                &pair.primary.masks,
                pair.em_final(),
                pair.diff.as_ref().map(|d| &d.locality),
            ),
            None => {
                let (rows, cols) = self.params.primary.analysis_block().grid_dim(h, w);
                zeros = MaskSet::zeros(h, w, rows, cols);
                (&zeros, &zeros.em, None)
            }
        };

        let (flow, merged) = match analysis.filter(|_| !trailing) {
            Some(pair) => {
                let flow = pair.primary.interpolate(self.engines, a, b, t)?;
                let merged = match &pair.diff {
                    Some(diff) => {
                        let flow2 = diff.secondary.interpolate(self.engines, a, b, t)?;
                        Some(diff.merge_flow(&flow, &flow2)?)
                    }
                    None => None,
                };
                (flow, merged)
            }
            None => (a.clone(), None),
        };

        let decision = self.compositor.decide(&masks.em_skip, h, w);
        let candidates = Candidates {
            flow: merged.as_ref().unwrap_or(&flow),
            blended: &blended,
            duplicated: &duplicated,
        };
        let composite = self.compositor.composite(candidates, em_final, &decision)?;

        let report = FrameReport {
            index: pos.index,
            pair: pos.pair,
            phase: t,
            decision,
        };
        debug!(
            index = report.index,
            pair = report.pair,
            phase = report.phase,
            skip = decision.skip,
            state = %decision.state.letter(),
            "Frame decision"
        );

        let frame = self.selector.route(&StageViews {
            composite: &composite,
            flow: &flow,
            blended: &blended,
            masks,
            em_final,
            locality,
            decision,
        })?;
        Ok((frame, Some(report)))
    }
}

/// Retime `frames` from `source` to `target` fps, handing every output frame
/// to `sink` in presentation order.
///
/// Configuration is validated against the clip resolution before any frame
/// is processed. Source pairs are analysed in batches so only a bounded
/// number of mask sets is alive at once.
pub fn retime_streaming<S>(
    frames: &[VideoFrame],
    source: FrameRate,
    target: FrameRate,
    config: &InterpolationConfig,
    engines: &Engines,
    reporter: &Arc<dyn ProgressReporter>,
    mut sink: S,
) -> Result<RetimeSummary>
where
    S: FnMut(usize, VideoFrame) -> Result<()>,
{
    let source = source.validated()?;
    let target = target.validated()?;
    let first = frames.first().ok_or(TempoError::EmptySequence)?;
    let (h, w) = first.dim();
    if h == 0 || w == 0 {
        return Err(TempoError::InvalidDimensions {
            width: w,
            height: h,
        });
    }
    for frame in frames {
        ensure_same_dim((h, w), frame.dim())?;
    }

    let params = resolve(config, w, h)?;
    let positions = plan_timeline(frames.len(), source, target);
    let n = frames.len();
    info!(
        source_frames = n,
        output_frames = positions.len(),
        source_fps = %source,
        target_fps = %target,
        output = %params.output,
        engine = engines.motion.name(),
        "Retiming clip"
    );

    let retimer = Retimer::new(frames, &params, engines, reporter)?;
    let needs_analysis = params.output.needs_analysis();
    let mut sequence: MaskSequence<PairAnalysis> = MaskSequence::new(n);
    let mut summary = RetimeSummary {
        source_frames: n,
        output_frames: positions.len(),
        source_fps: Some(source),
        target_fps: Some(target),
        ..RetimeSummary::default()
    };

    reporter.begin_stage(PipelineStage::Compositing, Some(positions.len()));
    let done = AtomicUsize::new(0);
    let mut start = 0;
    while start < positions.len() {
        let first_pair = positions[start].pair;
        let end_pair = first_pair + STREAMING_BATCH_SIZE;
        let end = start + positions[start..].partition_point(|p| p.pair < end_pair);
        let batch = &positions[start..end];

        if needs_analysis {
            let mut pairs: Vec<usize> = batch
                .iter()
                .filter(|p| !p.on_source())
                .map(|p| p.pair)
                .collect();
            pairs.dedup();
            let trailing = pairs.last() == Some(&(n - 1));
            if trailing && n >= 2 && sequence.get(n - 2).is_none() && !pairs.contains(&(n - 2)) {
                pairs.insert(pairs.len() - 1, n - 2);
            }
            pairs.retain(|&pair| pair + 1 < n);

            let analysed = map_collect(&pairs, |&pair| {
                retimer
                    .analyze_pair(pair)
                    .map(|analysis| (pair, analysis))
                    .map_err(|e| e.at_pair(pair))
            })?;
            for (pair, analysis) in analysed {
                sequence.insert(pair, analysis);
            }
            if trailing && sequence.patch_trailing() {
                debug!(pair = n - 1, "Trailing pair reuses the previous masks");
            }
        }

        let rendered = map_collect(batch, |pos| {
            let out = retimer.render(pos, &sequence)?;
            reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
            Ok(out)
        })?;
        for (pos, (frame, report)) in batch.iter().zip(rendered) {
            match report {
                Some(report) => summary.reports.push(report),
                None => summary.passthrough += usize::from(pos.on_source()),
            }
            sink(pos.index, frame)?;
        }

        sequence.release_before(end_pair.saturating_sub(1));
        start = end;
    }
    reporter.finish_stage();

    let counts = summary.state_counts();
    info!(
        interpolated = summary.reports.len(),
        passthrough = summary.passthrough,
        state_a = counts.get(&'A').copied().unwrap_or(0),
        state_b = counts.get(&'B').copied().unwrap_or(0),
        state_c = counts.get(&'C').copied().unwrap_or(0),
        "Retime complete"
    );
    Ok(summary)
}

/// Retime a clip held in memory.
pub fn retime_frames(
    frames: &[VideoFrame],
    source: FrameRate,
    target: FrameRate,
    config: &InterpolationConfig,
    engines: &Engines,
) -> Result<RetimeOutput> {
    let reporter: Arc<dyn ProgressReporter> = Arc::new(NoOpReporter);
    let mut out = Vec::new();
    let summary = retime_streaming(frames, source, target, config, engines, &reporter, |_, f| {
        out.push(f);
        Ok(())
    })?;
    Ok(RetimeOutput {
        frames: out,
        summary,
    })
}

/// Run the full processing pipeline with a thread-safe progress reporter.
pub fn run_pipeline_reported(
    config: &PipelineConfig,
    engines: &Engines,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<RetimeSummary> {
    let target = config.target_rate()?;

    reporter.begin_stage(PipelineStage::Reading, None);
    let frames = load_sequence(&config.input)?;
    reporter.finish_stage();
    info!(
        frames = frames.len(),
        input = %config.input.display(),
        "Loaded image sequence"
    );

    std::fs::create_dir_all(&config.output)?;
    let summary = retime_streaming(
        &frames,
        config.source_fps,
        target,
        &config.interpolation,
        engines,
        &reporter,
        |index, frame| {
            let path = frame_path(&config.output, index, config.format);
            save_video_frame(&frame, &path, config.format)
        },
    )?;
    info!(output = %config.output.display(), "Wrote retimed sequence");
    Ok(summary)
}

/// Run the full processing pipeline with the built-in engines.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RetimeSummary> {
    let engines = Engines::reference(
        config.interpolation.search_radius,
        config.interpolation.prefilter_sigma,
    );
    run_pipeline_reported(config, &engines, Arc::new(NoOpReporter))
}
