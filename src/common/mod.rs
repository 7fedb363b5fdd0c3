pub mod frame;
pub mod landmark;

pub use frame::Frame;
pub use landmark::{Landmark, LandmarkFrame, HAND_LANDMARK_COUNT};
