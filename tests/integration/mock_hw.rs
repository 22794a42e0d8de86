//! Mock hardware and socket adapters for integration tests.
//!
//! Records every LED call and every response so tests can assert on the full
//! history without touching GPIO or the network.

use std::collections::VecDeque;

use pinchlink::app::commands::Command;
use pinchlink::app::events::AppEvent;
use pinchlink::app::ports::{
    Acceptor, Clock, CommandTransport, Connection, EventSink, LandmarkSource, LedPort,
};
use pinchlink::error::{SendFailure, TransportError};
use pinchlink::gesture::landmarks::{LandmarkFrame, Point, ids};

// ── LED call record ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum LedCall {
    Set(bool),
    Blink { toggles: u8, delay_ms: u32 },
}

#[derive(Default)]
pub struct MockLed {
    pub calls: Vec<LedCall>,
}

#[allow(dead_code)]
impl MockLed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level after replaying the call history.
    pub fn is_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                LedCall::Set(on) => Some(*on),
                LedCall::Blink { .. } => Some(false),
            })
            .unwrap_or(false)
    }

    pub fn blinks(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, LedCall::Blink { .. }))
            .count()
    }
}

impl LedPort for MockLed {
    fn set(&mut self, on: bool) {
        self.calls.push(LedCall::Set(on));
    }

    fn blink(&mut self, toggles: u8, delay_ms: u32) {
        self.calls.push(LedCall::Blink { toggles, delay_ms });
    }
}

// ── Scripted connections ──────────────────────────────────────

/// Which step of a scripted connection fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None,
    Read(TransportError),
    Write(TransportError),
}

pub struct ScriptedConn {
    input: Vec<u8>,
    pos: usize,
    fault: Fault,
    pub written: Vec<u8>,
    pub closed: bool,
}

impl Connection for ScriptedConn {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if let Fault::Read(e) = self.fault {
            return Err(e);
        }
        let n = buf.len().min(self.input.len() - self.pos);
        buf[..n].copy_from_slice(&self.input[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if let Fault::Write(e) = self.fault {
            // Half the response made it out before the socket died.
            self.written.extend_from_slice(&data[..data.len() / 2]);
            return Err(e);
        }
        self.written.extend_from_slice(data);
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Hands out pre-scripted connections, then reports accept failures.
/// Finished connections are kept so tests can inspect what was written.
pub struct ScriptedAcceptor {
    pending: VecDeque<Result<(String, Fault), TransportError>>,
    pub log: std::rc::Rc<std::cell::RefCell<Vec<(Vec<u8>, bool)>>>,
}

#[allow(dead_code)]
impl ScriptedAcceptor {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            log: Default::default(),
        }
    }

    pub fn request(mut self, raw: &str) -> Self {
        self.pending.push_back(Ok((raw.to_string(), Fault::None)));
        self
    }

    pub fn faulty(mut self, raw: &str, fault: Fault) -> Self {
        self.pending.push_back(Ok((raw.to_string(), fault)));
        self
    }

    pub fn accept_error(mut self, e: TransportError) -> Self {
        self.pending.push_back(Err(e));
        self
    }
}

/// Connection wrapper that copies what was written into the acceptor log on close.
pub struct LoggedConn {
    inner: ScriptedConn,
    log: std::rc::Rc<std::cell::RefCell<Vec<(Vec<u8>, bool)>>>,
}

impl Connection for LoggedConn {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.inner.read(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.inner.write_all(data)
    }

    fn close(&mut self) {
        self.inner.close();
        self.log
            .borrow_mut()
            .push((self.inner.written.clone(), self.inner.closed));
    }
}

impl Acceptor for ScriptedAcceptor {
    type Conn = LoggedConn;

    fn accept(&mut self) -> Result<LoggedConn, TransportError> {
        let (raw, fault) = self
            .pending
            .pop_front()
            .unwrap_or(Err(TransportError::AcceptFailed))?;
        Ok(LoggedConn {
            inner: ScriptedConn {
                input: raw.into_bytes(),
                pos: 0,
                fault,
                written: Vec::new(),
                closed: false,
            },
            log: self.log.clone(),
        })
    }
}

// ── Client-side mocks ─────────────────────────────────────────

#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Vec<Command>,
    pub refuse: bool,
}

impl CommandTransport for RecordingTransport {
    fn send(&mut self, cmd: Command) -> Result<(), SendFailure> {
        if self.refuse {
            return Err(SendFailure::QueueFull);
        }
        self.sent.push(cmd);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

/// Replays a fixed list of frames, then finishes.
pub struct ReplaySource {
    frames: VecDeque<Option<LandmarkFrame>>,
}

impl ReplaySource {
    pub fn new(frames: impl IntoIterator<Item = Option<LandmarkFrame>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl LandmarkSource for ReplaySource {
    fn next_frame(&mut self) -> Option<LandmarkFrame> {
        self.frames.pop_front().flatten()
    }

    fn is_finished(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Advances by a fixed step on every read.
pub struct StepClock {
    now: std::cell::Cell<u32>,
    step: u32,
}

impl StepClock {
    pub fn new(start: u32, step: u32) -> Self {
        Self {
            now: std::cell::Cell::new(start),
            step,
        }
    }
}

impl Clock for StepClock {
    fn now_ms(&self) -> u32 {
        let t = self.now.get();
        self.now.set(t.wrapping_add(self.step));
        t
    }
}

/// Thumb tip at the origin, index and middle tips `distance` px away.
pub fn hand(distance: f32) -> LandmarkFrame {
    LandmarkFrame::from_points([
        (ids::WRIST, Point::new(0.0, 200.0)),
        (ids::THUMB_TIP, Point::new(0.0, 0.0)),
        (ids::INDEX_TIP, Point::new(distance, 0.0)),
        (ids::MIDDLE_TIP, Point::new(0.0, distance)),
    ])
}
