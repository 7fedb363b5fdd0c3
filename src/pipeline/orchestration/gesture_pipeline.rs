use tokio::sync::mpsc::{Receiver, Sender};
use tokio_util::sync::CancellationToken;

use super::frame_context::FrameContext;
use super::processing_step::ProcessingStep;
use super::steps::{ClassificationStep, DebounceForwardStep, DetectionDisplayStep};
use crate::common::Frame;
use crate::dashboard::Dashboard;
use crate::error::AppError;
use crate::pipeline::services::LandmarkClassifier;
use crate::pipeline::types::GestureLabel;

/// A pipeline that processes camera frames through a chain of steps
pub struct GesturePipeline {
    steps: Vec<Box<dyn ProcessingStep>>,
}

impl GesturePipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// classify → live display → debouncer
    pub fn standard(dashboard: Dashboard, label_tx: Sender<GestureLabel>) -> Self {
        Self::new()
            .add_step(Box::new(ClassificationStep::new(LandmarkClassifier::new())))
            .add_step(Box::new(DetectionDisplayStep::new(dashboard)))
            .add_step(Box::new(DebounceForwardStep::new(label_tx)))
    }

    pub fn add_step(mut self, step: Box<dyn ProcessingStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub async fn process(&mut self, frame: Frame) -> Result<FrameContext, AppError> {
        let mut context = FrameContext::new(frame);
        for step in &mut self.steps {
            tracing::trace!("Processing step: {}", step.name());
            step.process(&mut context).await?;
        }
        context.metrics.finalize();
        Ok(context)
    }

    /// Start processing frames from a receiver channel
    pub async fn start_processing(
        mut self,
        mut frame_rx: Receiver<Frame>,
        cancel_token: CancellationToken,
    ) -> Result<(), AppError> {
        tracing::info!("Gesture pipeline started - waiting for frames...");
        loop {
            let frame = tokio::select! {
                _ = cancel_token.cancelled() => break,
                frame = frame_rx.recv() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
            };
            match self.process(frame).await {
                Ok(context) => tracing::debug!(
                    "Frame {} classified as {:?} in {}us",
                    context.frame.frame_id(),
                    context.label,
                    context.metrics.total_processing_duration_us
                ),
                Err(AppError::Pipeline(e)) => {
                    tracing::error!("Gesture pipeline stopping: {}", e);
                    return Err(AppError::Pipeline(e));
                }
                Err(e) => tracing::error!("Error processing frame: {}", e),
            }
        }
        tracing::info!("Gesture pipeline stopped");
        Ok(())
    }
}

impl Default for GesturePipeline {
    fn default() -> Self {
        Self::new()
    }
}
