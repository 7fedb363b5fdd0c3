pub mod frame_context;
pub mod gesture_pipeline;
pub mod processing_step;
pub mod steps;

pub use frame_context::{FrameContext, FrameMetrics};
pub use gesture_pipeline::GesturePipeline;
pub use processing_step::ProcessingStep;
pub use steps::{ClassificationStep, DebounceForwardStep, DetectionDisplayStep};
