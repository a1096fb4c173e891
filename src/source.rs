// src/source.rs
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::SourceError;
use crate::pose::PoseFrame;

/// A producer of pose frames, such as a camera feeding a pose estimator.
pub trait PoseSource {
    /// Acquires the underlying device or stream.
    fn start(&mut self) -> Result<(), SourceError>;

    /// Next frame in arrival order, `None` once the stream has ended.
    fn next_frame(&mut self) -> Option<PoseFrame>;

    /// Releases the subscription. Calling it twice is harmless.
    fn stop(&mut self) {}
}

/// Pose frames recorded as JSON Lines, one `PoseFrame` per line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseTrace {
    pub frames: Vec<PoseFrame>,
    pub skipped_lines: usize,
}

impl PoseTrace {
    pub fn parse(reader: impl BufRead) -> Result<Self, SourceError> {
        let mut trace = PoseTrace::default();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match serde_json::from_str::<PoseFrame>(line) {
                Ok(frame) => trace.frames.push(frame),
                Err(e) => {
                    warn!("Skipping trace line {}: {}", i + 1, e);
                    trace.skipped_lines += 1;
                }
            }
        }

        Ok(trace)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let file = File::open(path.as_ref()).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => {
                SourceError::PermissionDenied(path.as_ref().display().to_string())
            }
            ErrorKind::NotFound => SourceError::Unavailable(format!(
                "trace file does not exist: {}",
                path.as_ref().display()
            )),
            _ => SourceError::Io(e),
        })?;
        Self::parse(BufReader::new(file))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SourceError> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        for frame in &self.frames {
            let line = serde_json::to_string(frame).map_err(std::io::Error::from)?;
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Replays frames from a recorded trace file, or from memory.
pub struct TraceSource {
    path: Option<PathBuf>,
    pending: VecDeque<PoseFrame>,
    skipped_lines: usize,
    started: bool,
}

impl TraceSource {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            pending: VecDeque::new(),
            skipped_lines: 0,
            started: false,
        }
    }

    pub fn from_frames(frames: Vec<PoseFrame>) -> Self {
        Self {
            path: None,
            pending: frames.into(),
            skipped_lines: 0,
            started: false,
        }
    }

    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }
}

impl PoseSource for TraceSource {
    fn start(&mut self) -> Result<(), SourceError> {
        if self.started {
            return Ok(());
        }
        if let Some(path) = &self.path {
            let trace = PoseTrace::load(path)?;
            debug!(
                "Loaded {} frames from {} ({} skipped)",
                trace.frames.len(),
                path.display(),
                trace.skipped_lines
            );
            self.skipped_lines = trace.skipped_lines;
            self.pending = trace.frames.into();
        }
        self.started = true;
        Ok(())
    }

    fn next_frame(&mut self) -> Option<PoseFrame> {
        if !self.started {
            return None;
        }
        self.pending.pop_front()
    }

    fn stop(&mut self) {
        self.pending.clear();
        self.started = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_skips_bad_lines_and_comments() {
        let input = "\
# recorded at 60 Hz
{\"timestamp_ms\": 0, \"pose\": null}
not json
{\"timestamp_ms\": 16}

{\"timestamp_ms\": 32, \"pose\": {\"right_wrist\": {\"x\": 1.0}}}
";
        let trace = PoseTrace::parse(Cursor::new(input)).unwrap();
        assert_eq!(trace.frames, vec![PoseFrame::empty(0), PoseFrame::empty(16)]);
        assert_eq!(trace.skipped_lines, 2);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = TraceSource::open(dir.path().join("missing.jsonl"));
        assert!(matches!(source.start(), Err(SourceError::Unavailable(_))));
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_save_then_replay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");
        let trace = PoseTrace {
            frames: vec![PoseFrame::empty(0), PoseFrame::empty(16)],
            skipped_lines: 0,
        };
        trace.save(&path).unwrap();

        let mut source = TraceSource::open(&path);
        source.start().unwrap();
        assert_eq!(source.next_frame(), Some(PoseFrame::empty(0)));
        assert_eq!(source.next_frame(), Some(PoseFrame::empty(16)));
        assert_eq!(source.next_frame(), None);
    }

    #[test]
    fn test_frames_require_start() {
        let mut source = TraceSource::from_frames(vec![PoseFrame::empty(0)]);
        assert!(source.next_frame().is_none());
        source.start().unwrap();
        assert!(source.next_frame().is_some());
    }
}
