use async_trait::async_trait;

use super::frame_context::FrameContext;
use crate::error::AppError;

/// Chain of Responsibility pattern for the gesture pipeline
#[async_trait]
pub trait ProcessingStep: Send + Sync {
    async fn process(&mut self, context: &mut FrameContext) -> Result<(), AppError>;
    fn name(&self) -> &'static str;
}
