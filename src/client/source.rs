//! Landmark sources.
//!
//! The perception pipeline itself (camera + hand tracker) lives outside this
//! crate. It feeds us JSON lines, one per frame:
//!
//! ```text
//! {"keypoints":[{"id":4,"x":312.0,"y":240.5},{"id":8,"x":330.1,"y":251.0}]}
//! {"keypoints":[]}
//! ```
//!
//! An empty `keypoints` array means no hand was visible. Only the newest
//! line matters: frames that arrive between two ticks replace each other.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::warn;
use serde::Deserialize;

use crate::app::ports::LandmarkSource;
use crate::gesture::landmarks::{HAND_LANDMARKS, LandmarkFrame, Point};

#[derive(Debug, Deserialize)]
struct Keypoint {
    id: u8,
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    keypoints: Vec<Keypoint>,
}

/// Parse one JSON line. `Ok(None)` is an absent hand.
pub fn parse_frame(line: &str) -> Result<Option<LandmarkFrame>, serde_json::Error> {
    let record: FrameRecord = serde_json::from_str(line)?;
    if record.keypoints.is_empty() {
        return Ok(None);
    }
    let mut frame = LandmarkFrame::new();
    for kp in record
        .keypoints
        .iter()
        .filter(|kp| usize::from(kp.id) < HAND_LANDMARKS)
    {
        frame.insert(kp.id, Point::new(kp.x, kp.y));
    }
    Ok(Some(frame))
}

struct Shared {
    latest: Signal<CriticalSectionRawMutex, Option<LandmarkFrame>>,
    eof: AtomicBool,
    bad_lines: AtomicU32,
}

/// Latest-frame source over a line-oriented reader (usually stdin).
///
/// A reader thread parses every line as it arrives and overwrites a single
/// slot, so a tracker running faster than the tick never builds a backlog.
/// Each tick sees the newest perception; between new lines the previous one
/// stands.
pub struct JsonLinesSource {
    shared: Arc<Shared>,
    current: Option<LandmarkFrame>,
    finished: bool,
}

impl JsonLinesSource {
    /// Start the reader thread.
    pub fn spawn<R>(reader: R) -> std::io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let shared = Arc::new(Shared {
            latest: Signal::new(),
            eof: AtomicBool::new(false),
            bad_lines: AtomicU32::new(0),
        });
        // Detached: a blocked stdin read cannot be interrupted anyway.
        std::thread::Builder::new()
            .name("pinchlink-frames".into())
            .spawn({
                let shared = shared.clone();
                move || pump_lines(reader, &shared)
            })?;
        Ok(Self {
            shared,
            current: None,
            finished: false,
        })
    }

    /// Lines that failed to parse so far (each counted as an absent hand).
    pub fn bad_lines(&self) -> u32 {
        self.shared.bad_lines.load(Ordering::Relaxed)
    }
}

fn pump_lines<R: BufRead>(mut reader: R, shared: &Shared) {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let text = line.trim();
                if text.is_empty() {
                    continue;
                }
                match parse_frame(text) {
                    Ok(frame) => shared.latest.signal(frame),
                    Err(e) => {
                        shared.bad_lines.fetch_add(1, Ordering::Relaxed);
                        warn!("CLIENT | bad landmark line: {}", e);
                        shared.latest.signal(None);
                    }
                }
            }
            Err(e) => {
                warn!("CLIENT | landmark source closed: {}", e);
                break;
            }
        }
    }
    shared.eof.store(true, Ordering::Release);
}

impl LandmarkSource for JsonLinesSource {
    fn next_frame(&mut self) -> Option<LandmarkFrame> {
        if self.finished {
            return None;
        }
        // Read the flag first so the last frame before EOF is never missed.
        let eof = self.shared.eof.load(Ordering::Acquire);
        if let Some(frame) = self.shared.latest.try_take() {
            self.current = frame;
        }
        if eof {
            self.finished = true;
            return self.current.take();
        }
        self.current.clone()
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}
