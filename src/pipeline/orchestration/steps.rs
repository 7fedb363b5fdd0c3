use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use super::frame_context::FrameContext;
use super::processing_step::ProcessingStep;
use crate::dashboard::{Dashboard, Detection};
use crate::error::AppError;
use crate::pipeline::services::LandmarkClassifier;
use crate::pipeline::types::GestureLabel;

pub struct ClassificationStep {
    classifier: LandmarkClassifier,
}

impl ClassificationStep {
    pub fn new(classifier: LandmarkClassifier) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl ProcessingStep for ClassificationStep {
    async fn process(&mut self, context: &mut FrameContext) -> Result<(), AppError> {
        context.label = self.classifier.classify(context.frame.hand());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "classification"
    }
}

/// Live "what the camera sees" feedback, independent of debouncing.
pub struct DetectionDisplayStep {
    dashboard: Dashboard,
}

impl DetectionDisplayStep {
    pub fn new(dashboard: Dashboard) -> Self {
        Self { dashboard }
    }
}

#[async_trait]
impl ProcessingStep for DetectionDisplayStep {
    async fn process(&mut self, context: &mut FrameContext) -> Result<(), AppError> {
        let detection = Detection::from_label(context.hand_present(), context.label);
        self.dashboard.update(|state| state.detection = detection);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "detection_display"
    }
}

/// Hands every label, "none" included, to the debouncer.
pub struct DebounceForwardStep {
    label_tx: Sender<GestureLabel>,
}

impl DebounceForwardStep {
    pub fn new(label_tx: Sender<GestureLabel>) -> Self {
        Self { label_tx }
    }
}

#[async_trait]
impl ProcessingStep for DebounceForwardStep {
    async fn process(&mut self, context: &mut FrameContext) -> Result<(), AppError> {
        self.label_tx
            .send(context.label)
            .await
            .map_err(|_| AppError::Pipeline("Gesture debouncer is not running".to_string()))
    }

    fn name(&self) -> &'static str {
        "debounce_forward"
    }
}
