//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GesturePipeline / CommandServer (domain)
//! ```
//!
//! Driven adapters (perception source, command transport, sockets,
//! sensors, event sinks) implement these traits. The domain consumes them
//! via generics, so neither the debouncer nor the server touches a camera
//! or a socket directly.

use core::fmt;

use crate::app::commands::Command;
use crate::error::{SendFailure, TransportError};
use crate::gesture::landmarks::LandmarkFrame;

// ───────────────────────────────────────────────────────────────
// Perception port (driven adapter: camera pipeline → domain)
// ───────────────────────────────────────────────────────────────

/// Supplies the current landmark frame at each sampling tick.
pub trait LandmarkSource {
    /// Landmarks of the tracked hand, or `None` if no hand is visible.
    /// Must not block the tick.
    fn next_frame(&mut self) -> Option<LandmarkFrame>;

    /// `true` once the source has no more frames (replays, closed pipes).
    /// Live sources never finish.
    fn is_finished(&self) -> bool {
        false
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock. Wraps at `u32::MAX`; consumers compare
/// with `wrapping_sub`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Command transport port (driven adapter: domain → actuator endpoint)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget delivery of committed commands.
///
/// Implementations must return promptly; a failure is reported for logging
/// only and is never retried by the caller.
pub trait CommandTransport {
    fn send(&mut self, cmd: Command) -> Result<(), SendFailure>;
}

// ───────────────────────────────────────────────────────────────
// Server socket ports
// ───────────────────────────────────────────────────────────────

/// A single accepted client connection.
pub trait Connection {
    /// Read up to `buf.len()` bytes of request data.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write the whole response.
    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Best-effort close. Dropping the connection must also close it.
    fn close(&mut self);

    /// Peer description for logs.
    fn peer(&self) -> Peer {
        Peer::Unknown
    }
}

/// Hands out connections one at a time.
pub trait Acceptor {
    type Conn: Connection;

    /// Block until one client connects.
    fn accept(&mut self) -> Result<Self::Conn, TransportError>;
}

/// Remote end of a connection, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peer {
    Addr(core::net::SocketAddr),
    Unknown,
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addr(a) => write!(f, "{a}"),
            Self::Unknown => write!(f, "?"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → LED hardware)
// ───────────────────────────────────────────────────────────────

/// The single LED the server drives.
///
/// Hardware errors are the adapter's business: it logs them and carries on,
/// so a flaky pin never takes the accept loop down.
pub trait LedPort {
    /// Drive the LED to a steady level.
    fn set(&mut self, on: bool);

    /// Run `toggles` on/off cycles, pausing `delay_ms` after each edge.
    /// Blocks for the full sequence and leaves the LED off.
    fn blink(&mut self, toggles: u8, delay_ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Sensor port (sibling deployment: read-only temperature sample)
// ───────────────────────────────────────────────────────────────

/// Read-only temperature sample shown on the status page.
pub trait TemperaturePort {
    /// Current die temperature in °C, or `None` if the read failed.
    fn read_celsius(&mut self) -> Option<f32>;
}

/// Stand-in for deployments without a temperature sensor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSensor;

impl TemperaturePort for NoSensor {
    fn read_celsius(&mut self) -> Option<f32> {
        None
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from loading or validating configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config file at the given location.
    NotFound,
    /// The config file exists but did not parse.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error while reading the file.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
