//! Unified error types for PinchLink.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level loops' error handling uniform. All variants are `Copy` so they
//! can be passed through connection outcomes and events without allocation.
//!
//! Two conditions that look like failures are deliberately *not* errors here:
//! an unrecognized command selector (it selects the fallback response) and an
//! absent hand (it resets debounce progress).

use core::fmt;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Per-connection I/O failure on the command server.
    Transport(TransportError),
    /// Client-side command delivery failure.
    Send(SendFailure),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// Peripheral or socket initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Send(e) => write!(f, "send: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Server transport errors
// ---------------------------------------------------------------------------

/// I/O failure on one accepted connection. Never fatal to the accept loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// `accept()` on the listening socket failed.
    AcceptFailed,
    /// Reading the request failed.
    ReadFailed,
    /// A read or write hit the per-connection timeout.
    Timeout,
    /// The peer hung up (reset or broken pipe) while the response was being written.
    Closed,
    /// Writing the response failed (peer reset, broken pipe).
    WriteFailed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AcceptFailed => write!(f, "accept failed"),
            Self::ReadFailed => write!(f, "request read failed"),
            Self::Timeout => write!(f, "connection i/o timed out"),
            Self::Closed => write!(f, "peer closed during response"),
            Self::WriteFailed => write!(f, "response write failed"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl TransportError {
    /// Classify a std I/O error raised while reading a request.
    pub fn from_read(e: &std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => Self::Timeout,
            _ => Self::ReadFailed,
        }
    }
}

// ---------------------------------------------------------------------------
// Client send failures
// ---------------------------------------------------------------------------

/// Client-side transport failure. Logged only; never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFailure {
    /// The outbound queue is full; the command was dropped.
    QueueFull,
    /// The sender task has shut down.
    Disconnected,
    /// Could not connect to the actuator endpoint.
    ConnectFailed,
    /// Connected, but the request could not be written.
    WriteFailed,
}

impl fmt::Display for SendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "send queue full"),
            Self::Disconnected => write!(f, "sender task stopped"),
            Self::ConnectFailed => write!(f, "connect failed"),
            Self::WriteFailed => write!(f, "request write failed"),
        }
    }
}

impl From<SendFailure> for Error {
    fn from(e: SendFailure) -> Self {
        Self::Send(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
