//! Landmark frame sources.
//!
//! The engine does not run a pose estimator itself; frames arrive from an
//! upstream process as JSON lines, one frame per line:
//!
//! ```text
//! {"t": 0.033, "hands": [{"label": "Left", "score": 0.97, "landmarks": [[0.5, 0.4, 0.0], ...]}]}
//! ```

use std::io::BufRead;
use std::sync::mpsc::Receiver;

use tracing::{debug, warn};

use crate::error::SourceError;
use crate::landmarks::{FrameRecord, LandmarkFrame};

/// Anything that yields landmark frames in capture order.
pub trait FrameSource {
    /// Next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, SourceError>;
}

/// Reads one JSON frame per line. Blank and unparseable lines are skipped.
pub struct JsonLinesSource<R: BufRead> {
    reader: R,
    line: String,
    line_no: u64,
    skipped: u64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
            skipped: 0,
        }
    }

    /// Lines dropped because they did not parse as a frame.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl<R: BufRead> FrameSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, SourceError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                debug!("Frame source exhausted after {} lines", self.line_no);
                return Ok(None);
            }
            self.line_no += 1;

            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            match serde_json::from_str::<FrameRecord>(text) {
                Ok(record) => return Ok(Some(record.into())),
                Err(e) => {
                    self.skipped += 1;
                    warn!("Frame source: line {} skipped: {}", self.line_no, e);
                }
            }
        }
    }
}

/// Replays a fixed list of frames.
#[derive(Debug)]
pub struct VecSource {
    frames: std::vec::IntoIter<LandmarkFrame>,
}

impl VecSource {
    pub fn new(frames: Vec<LandmarkFrame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl FrameSource for VecSource {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, SourceError> {
        Ok(self.frames.next())
    }
}

/// Frames pushed from another thread, e.g. a live capture loop.
///
/// The producer sends `None` to end the stream. Dropping the sender without
/// doing so is reported as [`SourceError::Closed`].
pub struct ChannelSource {
    rx: Receiver<Option<LandmarkFrame>>,
    finished: bool,
}

impl ChannelSource {
    pub fn new(rx: Receiver<Option<LandmarkFrame>>) -> Self {
        Self {
            rx,
            finished: false,
        }
    }
}

impl FrameSource for ChannelSource {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, SourceError> {
        if self.finished {
            return Ok(None);
        }
        match self.rx.recv() {
            Ok(Some(frame)) => Ok(Some(frame)),
            Ok(None) => {
                debug!("Frame channel finished");
                self.finished = true;
                Ok(None)
            }
            Err(_) => Err(SourceError::Closed("frame producer disconnected".into())),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────
