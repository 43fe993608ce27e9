use std::collections::BTreeMap;

use serde::Serialize;

use crate::composite::{DecisionState, FrameDecision};
use crate::frame::{FrameRate, VideoFrame};

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Reading,
    Prefiltering,
    Compositing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reading => write!(f, "Reading frames"),
            Self::Prefiltering => write!(f, "Prefiltering"),
            Self::Compositing => write!(f, "Interpolating and compositing"),
        }
    }
}

/// Decision record of one interpolated output frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    /// Output frame index.
    pub index: usize,
    /// First source frame of the pair.
    pub pair: usize,
    /// Temporal position between the pair, in (0, 1).
    pub phase: f32,
    pub decision: FrameDecision,
}

/// Aggregate of a finished run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RetimeSummary {
    pub source_frames: usize,
    pub output_frames: usize,
    pub source_fps: Option<FrameRate>,
    pub target_fps: Option<FrameRate>,
    /// Output frames copied straight from the source.
    pub passthrough: usize,
    pub reports: Vec<FrameReport>,
}

impl RetimeSummary {
    /// Number of interpolated frames per decision state.
    pub fn state_counts(&self) -> BTreeMap<char, usize> {
        let mut counts: BTreeMap<char, usize> = DecisionState::ALL
            .iter()
            .map(|state| (state.letter(), 0))
            .collect();
        for report in &self.reports {
            *counts.entry(report.decision.state.letter()).or_default() += 1;
        }
        counts
    }

    /// Mean skip statistic over interpolated frames.
    pub fn mean_skip(&self) -> Option<f32> {
        if self.reports.is_empty() {
            return None;
        }
        let total: f32 = self.reports.iter().map(|r| r.decision.skip).sum();
        Some(total / self.reports.len() as f32)
    }
}

/// Retimed clip held in memory.
#[derive(Clone, Debug)]
pub struct RetimeOutput {
    pub frames: Vec<VideoFrame>,
    pub summary: RetimeSummary,
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `run_pipeline` delegates.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
