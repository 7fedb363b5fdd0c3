pub mod landmark_source;

pub use landmark_source::{parse_landmark_line, JsonLinesSource, LandmarkSource};
