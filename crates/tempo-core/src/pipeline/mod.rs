pub mod config;
mod orchestrator;
pub mod timeline;
mod types;

pub use config::{InterpolationConfig, PipelineConfig};
pub use orchestrator::{retime_frames, retime_streaming, run_pipeline, run_pipeline_reported};
pub use timeline::{output_count, plan_timeline, OutputPosition};
pub use types::{
    FrameReport, NoOpReporter, PipelineStage, ProgressReporter, RetimeOutput, RetimeSummary,
};
