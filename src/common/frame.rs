use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::common::landmark::LandmarkFrame;

/// One camera frame as delivered by the landmark capability: at most one hand.
#[derive(Debug, Clone)]
pub struct Frame {
    source_id: Uuid,
    hand: Option<Arc<LandmarkFrame>>,
    captured_at: DateTime<Utc>,
    frame_id: Uuid,
}

impl Frame {
    pub fn new(
        source_id: Uuid,
        hand: Option<LandmarkFrame>,
        captured_at: DateTime<Utc>,
        frame_id: Uuid,
    ) -> Self {
        Self {
            source_id,
            hand: hand.map(Arc::new),
            captured_at,
            frame_id,
        }
    }

    /// Frame stamped now with a fresh id.
    pub fn capture(source_id: Uuid, hand: Option<LandmarkFrame>) -> Self {
        Self::new(source_id, hand, Utc::now(), Uuid::new_v4())
    }

    pub fn hand(&self) -> Option<&LandmarkFrame> {
        self.hand.as_deref()
    }

    pub fn get_source_id(&self) -> Uuid {
        self.source_id
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn frame_id(&self) -> Uuid {
        self.frame_id
    }
}
