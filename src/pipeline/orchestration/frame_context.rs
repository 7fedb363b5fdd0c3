use std::time::Instant;

use crate::common::Frame;
use crate::pipeline::types::GestureLabel;

/// One frame's trip through the gesture pipeline.
#[derive(Debug, Clone)]
pub struct FrameContext {
    pub frame: Frame,
    pub label: GestureLabel,
    pub metrics: FrameMetrics,
}

impl FrameContext {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            label: None,
            metrics: FrameMetrics::new(),
        }
    }

    pub fn hand_present(&self) -> bool {
        self.frame.hand().is_some()
    }
}

/// Timing collected while a frame is processed.
#[derive(Debug, Clone)]
pub struct FrameMetrics {
    pub processing_start: Instant,
    pub total_processing_duration_us: u64,
}

impl FrameMetrics {
    pub fn new() -> Self {
        Self {
            processing_start: Instant::now(),
            total_processing_duration_us: 0,
        }
    }

    pub fn finalize(&mut self) {
        self.total_processing_duration_us = self.processing_start.elapsed().as_micros() as u64;
    }
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
