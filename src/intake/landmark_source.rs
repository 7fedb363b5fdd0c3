use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::common::{Frame, Landmark, LandmarkFrame};
use crate::error::CameraError;

/// Per-frame hand landmarks from an external tracker.
#[async_trait]
pub trait LandmarkSource: Send {
    /// Next frame, or `None` once the source has ended.
    async fn next_frame(&mut self) -> Result<Option<Frame>, CameraError>;
}

#[derive(Deserialize)]
struct LandmarkLine {
    landmarks: Option<Vec<Landmark>>,
}

/// Decodes one `{"landmarks": [...] | null}` line. An empty list also means no hand.
pub fn parse_landmark_line(line: &str) -> Result<Option<LandmarkFrame>, CameraError> {
    let parsed: LandmarkLine =
        serde_json::from_str(line).map_err(|e| CameraError::Decode(e.to_string()))?;
    match parsed.landmarks {
        None => Ok(None),
        Some(points) if points.is_empty() => Ok(None),
        Some(points) => LandmarkFrame::try_from(points).map(Some).map_err(|count| {
            CameraError::Decode(format!("expected 21 landmarks, got {}", count))
        }),
    }
}

/// Reads JSON lines from any async reader, typically a tracker subprocess.
pub struct JsonLinesSource<R> {
    lines: LinesStream<R>,
    source_id: Uuid,
    // Held so the tracker dies with the source.
    _child: Option<Child>,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: LinesStream::new(reader.lines()),
            source_id: Uuid::new_v4(),
            _child: None,
        }
    }

    pub fn source_id(&self) -> Uuid {
        self.source_id
    }
}

impl JsonLinesSource<BufReader<ChildStdout>> {
    /// Starts the tracker program. A camera that can't be opened usually fails here.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self, CameraError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(CameraError::Spawn)?;
        let stdout = child.stdout.take().ok_or(CameraError::MissingOutput)?;
        tracing::info!("Landmark tracker '{}' started", program);
        let mut source = Self::from_reader(BufReader::new(stdout));
        source._child = Some(child);
        Ok(source)
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> LandmarkSource for JsonLinesSource<R> {
    async fn next_frame(&mut self) -> Result<Option<Frame>, CameraError> {
        while let Some(line) = self.lines.next().await {
            let line = line.map_err(CameraError::Read)?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_landmark_line(&line) {
                Ok(hand) => return Ok(Some(Frame::capture(self.source_id, hand))),
                Err(e) => tracing::warn!("Skipping landmark line: {}", e),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_line(y: f32) -> String {
        let points: Vec<String> = (0..21)
            .map(|_| format!(r#"{{"x":0.5,"y":{},"z":0.0}}"#, y))
            .collect();
        format!(r#"{{"landmarks":[{}]}}"#, points.join(","))
    }

    #[test]
    fn parses_hand_and_no_hand_lines() {
        let hand = parse_landmark_line(&hand_line(0.4)).unwrap().unwrap();
        assert_eq!(hand.point(0).y, 0.4);
        assert!(parse_landmark_line(r#"{"landmarks":null}"#).unwrap().is_none());
        assert!(parse_landmark_line(r#"{"landmarks":[]}"#).unwrap().is_none());
    }

    #[test]
    fn wrong_point_count_is_rejected() {
        let line = r#"{"landmarks":[{"x":0.1,"y":0.2}]}"#;
        assert!(matches!(
            parse_landmark_line(line),
            Err(CameraError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn reader_source_skips_garbage_and_ends() {
        let input = format!("{}\nnot json\n\n{}\n", hand_line(0.3), r#"{"landmarks":null}"#);
        let mut source = JsonLinesSource::from_reader(BufReader::new(input.as_bytes()));

        let first = source.next_frame().await.unwrap().unwrap();
        assert!(first.hand().is_some());
        assert_eq!(first.get_source_id(), source.source_id());

        let second = source.next_frame().await.unwrap().unwrap();
        assert!(second.hand().is_none());

        assert!(source.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let result = JsonLinesSource::spawn("/nonexistent/hand-tracker", &[]);
        assert!(matches!(result, Err(CameraError::Spawn(_))));
    }
}
